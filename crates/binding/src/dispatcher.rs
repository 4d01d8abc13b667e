//! Debounced dispatcher: one long-lived task per binding.
//!
//! Input edits restart a quiet-period timer. When the timer fires and the
//! executor is compiled, the latest input is handed to a new dispatch
//! chain. A fire while the executor is not ready is skipped; the input
//! stays pending and the timer is re-armed once readiness returns.
//!
//! Any input change immediately supersedes the chain in flight, so a job
//! for an outdated input never writes results.

use std::sync::Arc;
use std::time::Duration;

use livecheck_core::{CompilationStatus, Input};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::pipeline::{spawn_dispatch, DispatchContext};

/// Grace period for the last chain to send its best-effort cancel.
const TEARDOWN_TIMEOUT: Duration = Duration::from_secs(5);

struct InFlight {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Dispatcher {
    ctx: Arc<DispatchContext>,
    input_rx: watch::Receiver<Option<Input>>,
    status_rx: watch::Receiver<CompilationStatus>,
    shutdown: CancellationToken,
    pending: bool,
    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
}

impl Dispatcher {
    pub fn new(
        ctx: Arc<DispatchContext>,
        input_rx: watch::Receiver<Option<Input>>,
        status_rx: watch::Receiver<CompilationStatus>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            ctx,
            input_rx,
            status_rx,
            shutdown,
            pending: false,
            deadline: None,
            in_flight: None,
        }
    }

    /// Run until the shutdown token fires or the input side goes away.
    pub async fn run(mut self) {
        tracing::debug!(analysis = %self.ctx.kind, "Dispatcher started");

        if self.input_rx.borrow_and_update().is_some() {
            self.input_changed();
        }
        let mut status_open = true;

        loop {
            let deadline = self.deadline;
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                changed = self.input_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if self.input_rx.borrow_and_update().is_some() {
                        self.input_changed();
                    }
                }
                changed = self.status_rx.changed(), if status_open => {
                    if changed.is_err() {
                        tracing::warn!("Compilation status source closed; keeping last value");
                        status_open = false;
                        continue;
                    }
                    let ready = self.status_rx.borrow_and_update().is_ready();
                    if ready && self.pending && self.deadline.is_none() {
                        tracing::debug!("Executor ready again, re-arming pending dispatch");
                        self.arm();
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.fire();
                }
            }
        }

        self.teardown().await;
        tracing::debug!(analysis = %self.ctx.kind, "Dispatcher stopped");
    }

    fn input_changed(&mut self) {
        self.ctx.cell.supersede();
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
        }
        self.pending = true;
        self.arm();
    }

    fn arm(&mut self) {
        self.deadline = Some(Instant::now() + self.ctx.config.quiet_period);
    }

    fn fire(&mut self) {
        if !self.status_rx.borrow().is_ready() {
            tracing::debug!("Executor not compiled, withholding dispatch");
            return;
        }
        let Some(input) = self.input_rx.borrow().clone() else {
            return;
        };
        self.pending = false;

        let generation = self.ctx.cell.generation();
        let cancel = self.shutdown.child_token();
        let handle = spawn_dispatch(Arc::clone(&self.ctx), generation, input, cancel.clone());
        self.in_flight = Some(InFlight { cancel, handle });
    }

    async fn teardown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            let _ = tokio::time::timeout(TEARDOWN_TIMEOUT, in_flight.handle).await;
        }
    }
}
