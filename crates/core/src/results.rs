//! The value the binding core exposes to its consumers.

use serde::Serialize;

use crate::io::{Input, Output};
use crate::job::{JobRecord, ValidationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputState {
    /// Nothing to show yet for the pinned input.
    None,
    /// An older result, kept on screen while a newer input is in flight.
    Stale,
    /// The result of the pinned input.
    Current,
}

/// A complete, self-consistent snapshot of one binding's result.
///
/// Always replaced wholesale. `input` is the value that was active when
/// the owning job was submitted, never the live input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Results {
    pub input: Option<Input>,
    pub output_state: OutputState,
    pub output: Option<Output>,
    pub reference_output: Option<Output>,
    pub validation: Option<ValidationResult>,
    pub job: Option<JobRecord>,
}

impl Results {
    /// The value before anything has been dispatched.
    pub fn empty() -> Self {
        Self {
            input: None,
            output_state: OutputState::None,
            output: None,
            reference_output: None,
            validation: None,
            job: None,
        }
    }

    /// Emitted as soon as a job for `input` is being observed.
    pub fn waiting(input: Input) -> Self {
        Self {
            input: Some(input),
            ..Self::empty()
        }
    }

    pub fn succeeded(input: Input, record: JobRecord) -> Self {
        Self {
            input: Some(input),
            output_state: OutputState::Current,
            output: record.output.clone(),
            reference_output: record.reference_output.clone(),
            validation: record.validation.clone(),
            job: Some(record),
        }
    }

    pub fn failed(input: Input, record: JobRecord) -> Self {
        let message = record.failure_message();
        Self::failure(input, message, Some(record))
    }

    /// A locally synthesized failure (submission error, resolve timeout,
    /// or a failed job).
    pub fn failure(input: Input, message: impl Into<String>, job: Option<JobRecord>) -> Self {
        Self {
            input: Some(input),
            output_state: OutputState::Current,
            output: None,
            reference_output: None,
            validation: Some(ValidationResult::Failure {
                message: message.into(),
            }),
            job,
        }
    }

    /// Demote a current result once a newer input supersedes it.
    pub fn into_stale(self) -> Self {
        match self.output_state {
            OutputState::Current => Self {
                output_state: OutputState::Stale,
                ..self
            },
            _ => self,
        }
    }

    pub fn is_current(&self) -> bool {
        self.output_state == OutputState::Current
    }
}

impl Default for Results {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::analysis::AnalysisKind;
    use crate::job::{JobId, JobState};

    fn input() -> Input {
        Input::from_json(AnalysisKind::Sign, json!({"commands": "x := 1"}))
    }

    fn succeeded_record() -> JobRecord {
        let mut record = JobRecord::queued(JobId(1), AnalysisKind::Sign);
        record.state = JobState::Succeeded;
        record.output = Some(Output::from_json(AnalysisKind::Sign, json!("x")));
        record.validation = Some(ValidationResult::CorrectTerminated);
        record
    }

    #[test]
    fn succeeded_copies_record_fields() {
        let results = Results::succeeded(input(), succeeded_record());
        assert_eq!(results.output_state, OutputState::Current);
        assert_eq!(results.output.unwrap().json().as_str(), Some("x"));
        assert_eq!(results.validation, Some(ValidationResult::CorrectTerminated));
        assert_eq!(results.input, Some(input()));
    }

    #[test]
    fn failed_synthesizes_failure_validation() {
        let mut record = JobRecord::queued(JobId(2), AnalysisKind::Sign);
        record.state = JobState::Failed;
        record.stdout = "type error".into();

        let results = Results::failed(input(), record);
        assert!(results.output.is_none());
        assert!(results.reference_output.is_none());
        assert_eq!(
            results.validation,
            Some(ValidationResult::Failure {
                message: "type error".into()
            })
        );
        assert!(results.job.is_some());
    }

    #[test]
    fn only_current_becomes_stale() {
        let stale = Results::succeeded(input(), succeeded_record()).into_stale();
        assert_eq!(stale.output_state, OutputState::Stale);
        assert!(stale.output.is_some());

        let waiting = Results::waiting(input()).into_stale();
        assert_eq!(waiting.output_state, OutputState::None);
    }
}
