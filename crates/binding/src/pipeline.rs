//! One dispatch: submit, resolve, project.
//!
//! A chain runs as its own task under a child cancellation token. When a
//! newer input arrives the token is cancelled and every stage stops at
//! its next await point. A job left running by a superseded chain is
//! cancelled on the executor on a best-effort basis.

use std::sync::Arc;

use livecheck_core::{AnalysisKind, Executor, Input, JobId, JobRegistry, Results, Submission};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::cell::{ActiveJob, ResultsCell};
use crate::config::BindingConfig;
use crate::error::ResolveError;
use crate::projector::{project, ProjectOutcome};
use crate::resolver::resolve;

/// Everything a dispatch chain needs, shared by all chains of a binding.
pub struct DispatchContext {
    pub kind: AnalysisKind,
    pub executor: Arc<dyn Executor>,
    pub registry: Arc<dyn JobRegistry>,
    pub cell: Arc<ResultsCell>,
    pub config: BindingConfig,
}

/// Spawn a dispatch chain for `input` under `generation`.
pub fn spawn_dispatch(
    ctx: Arc<DispatchContext>,
    generation: u64,
    input: Input,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    let span = tracing::info_span!(
        "dispatch",
        analysis = %ctx.kind,
        generation,
        input_hash = %input.hash(),
    );
    tokio::spawn(run_dispatch(ctx, generation, input, cancel).instrument(span))
}

pub async fn run_dispatch(
    ctx: Arc<DispatchContext>,
    generation: u64,
    input: Input,
    cancel: CancellationToken,
) {
    let submission = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!("Submission aborted by newer input");
            return;
        }
        result = ctx.executor.submit(ctx.kind, &input) => result,
    };

    let Submission { id, meta } = match submission {
        Ok(submission) => submission,
        Err(e) => {
            tracing::warn!(error = %e, "Job submission failed");
            ctx.cell
                .publish(generation, Results::failure(input, e.to_string(), None));
            return;
        }
    };
    tracing::info!(job_id = %id, "Job submitted");

    ctx.cell.activate(
        generation,
        ActiveJob {
            id,
            meta,
            input: input.clone(),
        },
    );

    let record_rx = match resolve(ctx.registry.as_ref(), id, &ctx.config, &cancel).await {
        Ok(rx) => rx,
        Err(ResolveError::Cancelled) => {
            tracing::debug!(job_id = %id, "Resolution cancelled");
            cancel_remote(&ctx, id).await;
            return;
        }
        Err(e @ ResolveError::TimedOut { .. }) => {
            tracing::warn!(job_id = %id, error = %e, "Job never appeared in registry");
            ctx.cell
                .publish(generation, Results::failure(input, e.to_string(), None));
            cancel_remote(&ctx, id).await;
            return;
        }
    };

    match project(&ctx.cell, generation, input.clone(), record_rx, &cancel).await {
        ProjectOutcome::Terminal(state) => {
            tracing::info!(job_id = %id, ?state, "Job finished");
        }
        ProjectOutcome::Canceled => {
            tracing::debug!(job_id = %id, "Job canceled");
        }
        ProjectOutcome::Superseded => {
            tracing::debug!(job_id = %id, "Job superseded by newer input");
            cancel_remote(&ctx, id).await;
        }
        ProjectOutcome::Vanished => {
            tracing::warn!(job_id = %id, "Job record dropped before completion");
            ctx.cell.publish(
                generation,
                Results::failure(input, format!("job {id} disappeared before completion"), None),
            );
        }
    }
}

/// Ask the executor to stop `id` unless it already finished.
async fn cancel_remote(ctx: &DispatchContext, id: JobId) {
    if let Some(record) = ctx.registry.get_record(id) {
        if record.state.is_terminal() {
            return;
        }
    }
    if let Err(e) = ctx.executor.cancel_job(id).await {
        tracing::debug!(job_id = %id, error = %e, "Best-effort job cancel failed");
    }
}
