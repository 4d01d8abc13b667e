//! Line protocol read from stdin.
//!
//! Each non-empty line is either a `:`-prefixed command or a JSON value
//! that becomes the binding's new input.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the input with this JSON value.
    Input(Value),
    /// Ask the executor for a fresh input.
    Generate,
    /// Print the current results again.
    Show,
    Quit,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse one line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(name) = line.strip_prefix(':') {
        return match name.trim() {
            "generate" | "g" => Ok(Some(Command::Generate)),
            "show" | "s" => Ok(Some(Command::Show)),
            "quit" | "q" => Ok(Some(Command::Quit)),
            other => Err(CommandError::Unknown(other.to_string())),
        };
    }

    Ok(Some(Command::Input(serde_json::from_str(line)?)))
}
