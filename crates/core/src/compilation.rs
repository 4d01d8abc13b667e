use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompilerState {
    Compiling,
    Compiled,
    CompileError,
}

/// Whether the executor's analysis binary is currently usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationStatus {
    /// Milliseconds since the Unix epoch at which `state` was entered.
    pub compiled_at: i64,
    pub state: CompilerState,
}

impl CompilationStatus {
    pub fn new(state: CompilerState) -> Self {
        Self::at(state, chrono::Utc::now())
    }

    pub fn at(state: CompilerState, when: Timestamp) -> Self {
        Self {
            compiled_at: when.timestamp_millis(),
            state,
        }
    }

    /// Only a successful compilation lets jobs be submitted.
    pub fn is_ready(&self) -> bool {
        self.state == CompilerState::Compiled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_compiled_is_ready() {
        assert!(CompilationStatus::new(CompilerState::Compiled).is_ready());
        assert!(!CompilationStatus::new(CompilerState::Compiling).is_ready());
        assert!(!CompilationStatus::new(CompilerState::CompileError).is_ready());
    }
}
