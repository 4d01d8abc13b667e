//! Turns a submitted job id into a live record subscription.
//!
//! The registry learns about jobs from the executor's push stream, which
//! can lag behind the submission response. The resolver re-checks on
//! every poll tick and whenever the registry announces a new record,
//! bounded by the configured timeout.

use livecheck_core::{JobId, JobRecord, JobRegistry};
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::BindingConfig;
use crate::error::ResolveError;

pub async fn resolve(
    registry: &dyn JobRegistry,
    job_id: JobId,
    config: &BindingConfig,
    cancel: &CancellationToken,
) -> Result<watch::Receiver<JobRecord>, ResolveError> {
    // Subscribe before the first lookup so an insert in between is not missed.
    let mut added = Some(registry.record_added());
    let started = Instant::now();
    let deadline = started + config.resolve_timeout;

    loop {
        if let Some(rx) = registry.subscribe(job_id) {
            tracing::debug!(%job_id, waited_ms = started.elapsed().as_millis() as u64, "Job resolved");
            return Ok(rx);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ResolveError::Cancelled),
            _ = tokio::time::sleep_until(deadline) => {
                return registry.subscribe(job_id).ok_or(ResolveError::TimedOut {
                    job_id,
                    waited: config.resolve_timeout,
                });
            }
            _ = next_added(&mut added) => {}
            _ = tokio::time::sleep(config.poll_interval) => {}
        }
    }
}

/// Wait for the next "record added" notice.
///
/// Once the registry side is gone this never resolves and the resolver
/// falls back to polling.
async fn next_added(added: &mut Option<broadcast::Receiver<JobId>>) {
    let Some(rx) = added.as_mut() else {
        return std::future::pending().await;
    };
    let received = rx.recv().await;
    match received {
        Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        Err(broadcast::error::RecvError::Closed) => {
            *added = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use livecheck_core::{AnalysisKind, JobState};
    use livecheck_executor::InMemoryJobRegistry;

    use super::*;

    fn config() -> BindingConfig {
        BindingConfig {
            resolve_timeout: Duration::from_secs(2),
            ..BindingConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_immediately_when_known() {
        let registry = InMemoryJobRegistry::new();
        registry.apply(JobRecord::queued(JobId(1), AnalysisKind::Parse));

        let rx = resolve(&registry, JobId(1), &config(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(rx.borrow().state, JobState::Queued);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_late_arrival() {
        let registry = Arc::new(InMemoryJobRegistry::new());
        let writer = Arc::clone(&registry);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(650)).await;
            writer.apply(JobRecord::queued(JobId(9), AnalysisKind::Parse));
        });

        let started = Instant::now();
        let rx = resolve(&*registry, JobId(9), &config(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rx.borrow().id, JobId(9));
        assert!(started.elapsed() < Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_timeout() {
        let registry = InMemoryJobRegistry::new();

        let err = resolve(&registry, JobId(4), &config(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ResolveError::TimedOut {
                job_id: JobId(4),
                waited: Duration::from_secs(2)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_wait() {
        let registry = InMemoryJobRegistry::new();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = resolve(&registry, JobId(4), &config(), &cancel).await.unwrap_err();
        assert_eq!(err, ResolveError::Cancelled);
    }
}
