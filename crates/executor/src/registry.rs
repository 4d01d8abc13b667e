//! In-memory job registry fed by the executor event stream.
//!
//! Every known job owns a [`watch`] channel holding its latest
//! [`JobRecord`]. Readers either query the current value or subscribe to
//! the channel; dropping the receiver is the unsubscribe.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use livecheck_core::{JobId, JobRecord, JobRegistry};
use tokio::sync::{broadcast, watch};

/// Broadcast channel capacity for "record added" notifications.
const ADDED_CHANNEL_CAPACITY: usize = 256;

/// Shared map of job id to live job record.
///
/// Mutated only by the event-stream consumer; shared by every binding.
pub struct InMemoryJobRegistry {
    records: RwLock<HashMap<JobId, watch::Sender<JobRecord>>>,
    added_tx: broadcast::Sender<JobId>,
}

impl InMemoryJobRegistry {
    pub fn new() -> Self {
        let (added_tx, _) = broadcast::channel(ADDED_CHANNEL_CAPACITY);
        Self {
            records: RwLock::new(HashMap::new()),
            added_tx,
        }
    }

    /// Insert or replace the record for `record.id`.
    ///
    /// Subscribers are only woken when the record actually changed.
    pub fn apply(&self, record: JobRecord) {
        let id = record.id;
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(tx) = records.get(&id) {
            tx.send_if_modified(|current| {
                if *current == record {
                    return false;
                }
                *current = record;
                true
            });
            return;
        }

        let (tx, _) = watch::channel(record);
        records.insert(id, tx);
        drop(records);

        tracing::trace!(job_id = %id, "Job record added");
        // A SendError only means nobody is waiting.
        let _ = self.added_tx.send(id);
    }

    /// Forget a job. Live subscribers observe their channel closing.
    pub fn remove(&self, id: JobId) -> Option<JobRecord> {
        let removed = self
            .records
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        removed.map(|tx| tx.borrow().clone())
    }

    pub fn len(&self) -> usize {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryJobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry for InMemoryJobRegistry {
    fn get_record(&self, id: JobId) -> Option<JobRecord> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|tx| tx.borrow().clone())
    }

    fn subscribe(&self, id: JobId) -> Option<watch::Receiver<JobRecord>> {
        self.records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .map(|tx| tx.subscribe())
    }

    fn record_added(&self) -> broadcast::Receiver<JobId> {
        self.added_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use livecheck_core::{AnalysisKind, JobState};

    use super::*;

    fn record(id: u64, state: JobState) -> JobRecord {
        let mut record = JobRecord::queued(JobId(id), AnalysisKind::Sign);
        record.state = state;
        record
    }

    #[test]
    fn unknown_id_is_absent() {
        let registry = InMemoryJobRegistry::new();
        assert!(registry.get_record(JobId(1)).is_none());
        assert!(registry.subscribe(JobId(1)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn apply_inserts_then_replaces() {
        let registry = InMemoryJobRegistry::new();
        registry.apply(record(1, JobState::Queued));
        registry.apply(record(1, JobState::Running));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_record(JobId(1)).map(|r| r.state),
            Some(JobState::Running)
        );
    }

    #[tokio::test]
    async fn subscribers_see_changes() {
        let registry = InMemoryJobRegistry::new();
        registry.apply(record(1, JobState::Queued));

        let mut rx = registry.subscribe(JobId(1)).expect("record exists");
        registry.apply(record(1, JobState::Succeeded));

        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().state, JobState::Succeeded);
    }

    #[tokio::test]
    async fn identical_snapshot_does_not_notify() {
        let registry = InMemoryJobRegistry::new();
        registry.apply(record(1, JobState::Running));

        let rx = registry.subscribe(JobId(1)).expect("record exists");
        registry.apply(record(1, JobState::Running));

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn added_ids_are_broadcast_once() {
        let registry = InMemoryJobRegistry::new();
        let mut added = registry.record_added();

        registry.apply(record(5, JobState::Queued));
        registry.apply(record(5, JobState::Running));

        assert_eq!(added.recv().await.unwrap(), JobId(5));
        assert!(added.try_recv().is_err());
    }

    #[tokio::test]
    async fn remove_closes_subscriptions() {
        let registry = InMemoryJobRegistry::new();
        registry.apply(record(2, JobState::Running));
        let mut rx = registry.subscribe(JobId(2)).expect("record exists");

        let removed = registry.remove(JobId(2));
        assert_eq!(removed.map(|r| r.state), Some(JobState::Running));
        assert!(rx.changed().await.is_err());
        assert!(registry.get_record(JobId(2)).is_none());
    }
}
