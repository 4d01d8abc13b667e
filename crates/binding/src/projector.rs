//! Maps a live job record onto the binding's [`Results`].

use livecheck_core::{Input, JobRecord, JobState, Results};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::cell::ResultsCell;

/// How the observation of one job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOutcome {
    /// `Succeeded` or `Failed` was published.
    Terminal(JobState),
    /// The job was canceled; results are left untouched.
    Canceled,
    /// A newer input took over before the job finished.
    Superseded,
    /// The registry dropped the record while it was still running.
    Vanished,
}

/// Follow `record_rx` until the job reaches a terminal state.
///
/// Publishes an empty result pinned to `input` first, then the terminal
/// result. Every write is guarded by `generation`.
pub async fn project(
    cell: &ResultsCell,
    generation: u64,
    input: Input,
    mut record_rx: watch::Receiver<JobRecord>,
    cancel: &CancellationToken,
) -> ProjectOutcome {
    if !cell.publish(generation, Results::waiting(input.clone())) {
        return ProjectOutcome::Superseded;
    }

    loop {
        let record = record_rx.borrow_and_update().clone();
        tracing::trace!(job_id = %record.id, state = ?record.state, "Job record update");

        let state = record.state;
        let results = match state {
            JobState::Queued | JobState::Running => None,
            JobState::Succeeded => Some(Results::succeeded(input.clone(), record)),
            JobState::Failed => Some(Results::failed(input.clone(), record)),
            JobState::Canceled => return ProjectOutcome::Canceled,
        };

        if let Some(results) = results {
            if !cell.publish(generation, results) {
                return ProjectOutcome::Superseded;
            }
            return ProjectOutcome::Terminal(state);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return ProjectOutcome::Superseded,
            changed = record_rx.changed() => {
                if changed.is_err() {
                    return ProjectOutcome::Vanished;
                }
            }
        }
    }
}
