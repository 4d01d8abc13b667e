//! One reactive binding: an input cell wired to a results cell.

use std::sync::Arc;
use std::time::Duration;

use livecheck_core::{
    AnalysisKind, CompilationStatus, CoreError, Executor, Input, JobRegistry, Results,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cell::{ActiveJob, ResultsCell};
use crate::config::BindingConfig;
use crate::dispatcher::Dispatcher;
use crate::error::BindingError;
use crate::generation;
use crate::pipeline::DispatchContext;

/// Handle to a running binding for one analysis kind.
///
/// Writes to the input are debounced and dispatched to the executor; the
/// outcome is published as [`Results`]. Created via [`Binding::spawn`].
pub struct Binding {
    kind: AnalysisKind,
    executor: Arc<dyn Executor>,
    input_tx: watch::Sender<Option<Input>>,
    cell: Arc<ResultsCell>,
    shutdown: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Binding {
    /// Start the dispatcher task. Must be called from within a Tokio runtime.
    pub fn spawn(
        kind: AnalysisKind,
        executor: Arc<dyn Executor>,
        registry: Arc<dyn JobRegistry>,
        status: watch::Receiver<CompilationStatus>,
        config: BindingConfig,
    ) -> Arc<Self> {
        let (input_tx, input_rx) = watch::channel(None);
        let cell = Arc::new(ResultsCell::new());
        let shutdown = CancellationToken::new();
        let generate_on_create = config.generate_on_create;

        let ctx = Arc::new(DispatchContext {
            kind,
            executor: Arc::clone(&executor),
            registry,
            cell: Arc::clone(&cell),
            config,
        });
        let dispatcher = Dispatcher::new(ctx, input_rx, status, shutdown.clone());
        let mut tasks = vec![tokio::spawn(dispatcher.run())];

        if generate_on_create {
            let executor = Arc::clone(&executor);
            let input_tx = input_tx.clone();
            let shutdown = shutdown.clone();
            tasks.push(tokio::spawn(async move {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = generation::generate_default(executor.as_ref(), kind, &input_tx) => {}
                }
            }));
        }

        tracing::info!(analysis = %kind, "Binding started");

        Arc::new(Self {
            kind,
            executor,
            input_tx,
            cell,
            shutdown,
            tasks: Mutex::new(tasks),
        })
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    /// The live input, or `None` before anything was written.
    pub fn input(&self) -> Option<Input> {
        self.input_tx.borrow().clone()
    }

    /// Observe every input change.
    pub fn watch_input(&self) -> watch::Receiver<Option<Input>> {
        self.input_tx.subscribe()
    }

    /// Replace the input. Restarts the quiet period.
    pub fn set_input(&self, input: Input) -> Result<(), BindingError> {
        self.ensure_open()?;
        if input.analysis() != self.kind {
            return Err(CoreError::KindMismatch {
                expected: self.kind,
                actual: input.analysis(),
            }
            .into());
        }
        tracing::debug!(analysis = %self.kind, input_hash = %input.hash(), "Input updated");
        self.input_tx.send_replace(Some(input));
        Ok(())
    }

    /// Replace the input with a raw JSON value for this binding's kind.
    pub fn set_input_value(&self, json: serde_json::Value) -> Result<Input, BindingError> {
        let input = Input::from_json(self.kind, json);
        self.set_input(input.clone())?;
        Ok(input)
    }

    /// Ask the executor for a fresh input and make it the current one.
    pub async fn generate(&self) -> Result<Input, BindingError> {
        self.ensure_open()?;
        generation::generate(self.executor.as_ref(), self.kind, &self.input_tx).await
    }

    /// Latest published results.
    pub fn results(&self) -> Results {
        self.cell.results()
    }

    /// Observe every published results value.
    pub fn subscribe(&self) -> watch::Receiver<Results> {
        self.cell.subscribe()
    }

    /// The job submitted for the live input, once the executor accepted it.
    pub fn active_job(&self) -> Option<ActiveJob> {
        self.cell.active_job()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Stop dispatching and cancel the job in flight.
    ///
    /// Waits up to 5 seconds per background task.
    pub async fn shutdown(&self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        tracing::info!(analysis = %self.kind, "Shutting down binding");
        self.shutdown.cancel();

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        for handle in tasks {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    fn ensure_open(&self) -> Result<(), BindingError> {
        if self.shutdown.is_cancelled() {
            return Err(BindingError::Closed(self.kind));
        }
        Ok(())
    }
}
