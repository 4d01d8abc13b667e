//! Shared fixtures for binding tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use livecheck_binding::{Binding, BindingConfig};
use livecheck_core::{
    AnalysisKind, CompilationStatus, CompilerState, Executor, ExecutorError, Input, JobId,
    JobMeta, JobRecord, JobRegistry, JobState, Output, Submission, ValidationResult,
};
use livecheck_executor::InMemoryJobRegistry;
use serde_json::json;
use tokio::sync::watch;

pub const KIND: AnalysisKind = AnalysisKind::Sign;

/// Executor double that records every call.
///
/// Job ids are handed out in order starting at 1, once a submission
/// completes. Nothing is pushed into the registry; tests drive job
/// records themselves.
#[derive(Default)]
pub struct FakeExecutor {
    next_id: AtomicU64,
    generated: AtomicU64,
    pub submissions: Mutex<Vec<Input>>,
    pub cancels: Mutex<Vec<JobId>>,
    submit_error: Mutex<Option<ExecutorError>>,
    submit_delay: Mutex<Duration>,
}

impl FakeExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_submissions(&self, error: ExecutorError) {
        *self.submit_error.lock().unwrap() = Some(error);
    }

    pub fn delay_submissions(&self, delay: Duration) {
        *self.submit_delay.lock().unwrap() = delay;
    }

    pub fn submitted(&self) -> Vec<Input> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<JobId> {
        self.cancels.lock().unwrap().clone()
    }
}

#[async_trait]
impl Executor for FakeExecutor {
    async fn submit(&self, kind: AnalysisKind, input: &Input) -> Result<Submission, ExecutorError> {
        self.submissions.lock().unwrap().push(input.clone());

        let delay = *self.submit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.submit_error.lock().unwrap().clone() {
            return Err(error);
        }

        let id = JobId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        Ok(Submission {
            id,
            meta: JobMeta::from_json(kind, json!({"job": id.0})),
        })
    }

    async fn cancel_job(&self, id: JobId) -> Result<(), ExecutorError> {
        self.cancels.lock().unwrap().push(id);
        Ok(())
    }

    async fn generate(&self, kind: AnalysisKind) -> Result<Input, ExecutorError> {
        let n = self.generated.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Input::from_json(kind, json!({"generated": n})))
    }

    async fn compilation_status(&self) -> Result<CompilationStatus, ExecutorError> {
        Ok(CompilationStatus::new(CompilerState::Compiled))
    }
}

pub struct Harness {
    pub executor: Arc<FakeExecutor>,
    pub registry: Arc<InMemoryJobRegistry>,
    pub status_tx: watch::Sender<CompilationStatus>,
    pub binding: Arc<Binding>,
}

impl Harness {
    pub fn start(config: BindingConfig) -> Self {
        Self::start_with(config, CompilerState::Compiled)
    }

    pub fn start_with(config: BindingConfig, state: CompilerState) -> Self {
        let executor = FakeExecutor::new();
        let registry = Arc::new(InMemoryJobRegistry::new());
        let (status_tx, status_rx) = watch::channel(CompilationStatus::new(state));
        let binding = Binding::spawn(
            KIND,
            Arc::clone(&executor) as Arc<dyn Executor>,
            Arc::clone(&registry) as Arc<dyn JobRegistry>,
            status_rx,
            config,
        );
        Self {
            executor,
            registry,
            status_tx,
            binding,
        }
    }

    pub fn set_state(&self, state: CompilerState) {
        self.status_tx.send_replace(CompilationStatus::new(state));
    }

    pub fn push(&self, record: JobRecord) {
        self.registry.apply(record);
    }
}

/// Config without auto-generation so tests control every input.
pub fn manual_config() -> BindingConfig {
    BindingConfig {
        generate_on_create: false,
        ..BindingConfig::default()
    }
}

pub fn input(text: &str) -> Input {
    Input::from_json(KIND, json!({"commands": text}))
}

pub fn record(id: u64, state: JobState) -> JobRecord {
    let mut record = JobRecord::queued(JobId(id), KIND);
    record.state = state;
    record
}

pub fn succeeded(id: u64, output: &str) -> JobRecord {
    let mut record = record(id, JobState::Succeeded);
    record.output = Some(Output::from_json(KIND, json!(output)));
    record.validation = Some(ValidationResult::CorrectTerminated);
    record
}

pub async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
