use std::fmt;

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisKind;
use crate::io::{JobMeta, Output};

/// Identifier assigned by the executor when it accepts a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Canceled
        )
    }
}

/// Outcome of checking a job's output against the reference.
///
/// `Failure` never comes from the executor: it is synthesized locally
/// when the job itself fails or never becomes observable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ValidationResult {
    CorrectTerminated,
    CorrectNonTerminated { iterations: u32 },
    Mismatch { reason: String },
    TimeOut,
    Failure { message: String },
}

/// The executor-owned record of a job, as last reported on the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub analysis: AnalysisKind,
    pub state: JobState,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub output: Option<Output>,
    #[serde(default)]
    pub reference_output: Option<Output>,
    #[serde(default)]
    pub validation: Option<ValidationResult>,
    /// Human-readable diagnostic, set by the executor on failure.
    #[serde(default)]
    pub message: Option<String>,
}

impl JobRecord {
    /// A freshly accepted job with no output yet.
    pub fn queued(id: JobId, analysis: AnalysisKind) -> Self {
        Self {
            id,
            analysis,
            state: JobState::Queued,
            stdout: String::new(),
            stderr: String::new(),
            output: None,
            reference_output: None,
            validation: None,
            message: None,
        }
    }

    /// The diagnostic to surface when this job failed: its recorded
    /// stdout if any, otherwise the executor's message.
    pub fn failure_message(&self) -> String {
        if !self.stdout.trim().is_empty() {
            return self.stdout.clone();
        }
        self.message
            .clone()
            .unwrap_or_else(|| format!("job {} failed", self.id))
    }
}

/// What the executor hands back when it accepts a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: JobId,
    pub meta: JobMeta,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Succeeded.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::Canceled.is_terminal());
    }

    #[test]
    fn validation_is_tagged_by_type() {
        let failure = ValidationResult::Failure {
            message: "boom".into(),
        };
        assert_eq!(
            serde_json::to_value(&failure).unwrap(),
            json!({"type": "Failure", "message": "boom"})
        );
        assert_eq!(
            serde_json::to_value(ValidationResult::CorrectTerminated).unwrap(),
            json!({"type": "CorrectTerminated"})
        );
    }

    #[test]
    fn record_defaults_missing_fields() {
        let record: JobRecord = serde_json::from_value(json!({
            "id": 4,
            "analysis": "Sign",
            "state": "Running",
        }))
        .unwrap();
        assert_eq!(record, {
            let mut r = JobRecord::queued(JobId(4), AnalysisKind::Sign);
            r.state = JobState::Running;
            r
        });
    }

    #[test]
    fn failure_message_prefers_stdout() {
        let mut record = JobRecord::queued(JobId(1), AnalysisKind::Calc);
        record.message = Some("exit status 1".into());
        assert_eq!(record.failure_message(), "exit status 1");

        record.stdout = "parse error at 1:4".into();
        assert_eq!(record.failure_message(), "parse error at 1:4");

        record.stdout.clear();
        record.message = None;
        assert_eq!(record.failure_message(), "job 1 failed");
    }
}
