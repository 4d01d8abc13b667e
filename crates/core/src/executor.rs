//! Collaborator seams of the binding core.
//!
//! [`Executor`] is the remote side that accepts, cancels and generates
//! jobs. [`JobRegistry`] is the read side of the event-stream-fed map of
//! job records. Both are shared across every binding instance.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use crate::analysis::AnalysisKind;
use crate::compilation::CompilationStatus;
use crate::error::ExecutorError;
use crate::io::Input;
use crate::job::{JobId, JobRecord, Submission};

#[async_trait]
pub trait Executor: Send + Sync {
    /// Ask the executor to run `kind` against `input`.
    ///
    /// Dropping the returned future before it resolves aborts the
    /// request.
    async fn submit(&self, kind: AnalysisKind, input: &Input) -> Result<Submission, ExecutorError>;

    /// Best-effort cancellation of a queued or running job.
    async fn cancel_job(&self, id: JobId) -> Result<(), ExecutorError>;

    /// Produce a fresh default input for `kind`.
    async fn generate(&self, kind: AnalysisKind) -> Result<Input, ExecutorError>;

    async fn compilation_status(&self) -> Result<CompilationStatus, ExecutorError>;
}

pub trait JobRegistry: Send + Sync {
    /// Point query for the latest known record.
    fn get_record(&self, id: JobId) -> Option<JobRecord>;

    /// Live view of a record. Dropping the receiver unsubscribes.
    ///
    /// Returns `None` while the id is not (yet) known.
    fn subscribe(&self, id: JobId) -> Option<watch::Receiver<JobRecord>>;

    /// Ids of records as they first appear in the registry.
    fn record_added(&self) -> broadcast::Receiver<JobId>;
}
