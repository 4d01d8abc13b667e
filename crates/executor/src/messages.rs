//! Executor event-stream message types and parser.
//!
//! The executor pushes JSON text frames with the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`ExecutorMessage`] enum.

use livecheck_core::{CompilationStatus, JobId, JobRecord};
use serde::Deserialize;

/// All known event-stream message types.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ExecutorMessage {
    /// Full snapshot of a job record. Sent when a job is accepted and on
    /// every subsequent change.
    #[serde(rename = "job")]
    Job(JobRecord),

    /// The executor forgot about a job.
    #[serde(rename = "job_removed")]
    JobRemoved(JobRemovedData),

    /// The analysis binary was (re)compiled or is compiling.
    #[serde(rename = "compilation_status")]
    Compilation(CompilationStatus),
}

/// Payload for `job_removed` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct JobRemovedData {
    pub id: JobId,
}

/// Parse an event-stream text frame into a typed enum.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
/// Callers should log and continue.
pub fn parse_message(text: &str) -> Result<ExecutorMessage, serde_json::Error> {
    serde_json::from_str(text)
}
