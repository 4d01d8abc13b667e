//! Generation-guarded output cell of a binding.
//!
//! Every input change bumps the generation. Writers carry the generation
//! they were started under and are silently ignored once it is outdated,
//! so a superseded job can never touch the published [`Results`].

use std::sync::atomic::{AtomicU64, Ordering};

use livecheck_core::{Input, JobId, JobMeta, Results};
use tokio::sync::watch;

/// The job currently owned by a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub id: JobId,
    pub meta: JobMeta,
    pub input: Input,
}

pub struct ResultsCell {
    results_tx: watch::Sender<Results>,
    active_tx: watch::Sender<Option<ActiveJob>>,
    generation: AtomicU64,
}

impl ResultsCell {
    pub fn new() -> Self {
        let (results_tx, _) = watch::channel(Results::empty());
        let (active_tx, _) = watch::channel(None);
        Self {
            results_tx,
            active_tx,
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    /// Invalidate every writer of the previous generation.
    ///
    /// A `Current` result is demoted to `Stale`; anything else is kept
    /// as-is. Returns the new generation.
    pub fn supersede(&self) -> u64 {
        let mut next = 0;
        // The bump happens under the channel lock so it is ordered with
        // `publish`.
        self.results_tx.send_if_modified(|results| {
            next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if !results.is_current() {
                return false;
            }
            *results = std::mem::take(results).into_stale();
            true
        });
        self.active_tx.send_if_modified(|active| active.take().is_some());
        next
    }

    /// Replace the results if `generation` is still the live one.
    pub fn publish(&self, generation: u64, results: Results) -> bool {
        self.results_tx.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = results;
            true
        })
    }

    /// Record the job submitted for `generation` as the active one.
    pub fn activate(&self, generation: u64, job: ActiveJob) -> bool {
        self.active_tx.send_if_modified(|active| {
            if !self.is_current(generation) {
                return false;
            }
            *active = Some(job);
            true
        })
    }

    pub fn results(&self) -> Results {
        self.results_tx.borrow().clone()
    }

    pub fn active_job(&self) -> Option<ActiveJob> {
        self.active_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Results> {
        self.results_tx.subscribe()
    }
}

impl Default for ResultsCell {
    fn default() -> Self {
        Self::new()
    }
}
