use std::time::Duration;

use livecheck_core::{AnalysisKind, CoreError, ExecutorError, JobId};

#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Binding for {0} has been shut down")]
    Closed(AnalysisKind),
}

/// Why a submitted job could not be resolved to a live record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// A newer dispatch or teardown stopped the wait. Not a failure.
    #[error("Resolution cancelled")]
    Cancelled,

    #[error("Job {job_id} did not appear in the job registry within {waited:?}")]
    TimedOut { job_id: JobId, waited: Duration },
}
