use crate::analysis::AnalysisKind;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Input is for {actual}, binding is for {expected}")]
    KindMismatch {
        expected: AnalysisKind,
        actual: AnalysisKind,
    },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    #[error("Unknown analysis kind: {0}")]
    UnknownAnalysis(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors reported by an executor implementation.
///
/// Transport-specific errors are flattened into strings so that the
/// binding core does not depend on any particular HTTP stack.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    /// The request never produced a response (network, DNS, TLS, etc.).
    #[error("Request failed: {0}")]
    Request(String),

    /// The executor answered with a non-2xx status code.
    #[error("Executor error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),
}
