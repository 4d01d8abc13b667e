//! Lazily created binding per analysis kind.
//!
//! All bindings share one executor, one job registry and one compilation
//! status source.

use std::collections::HashMap;
use std::sync::Arc;

use livecheck_core::{AnalysisKind, CompilationStatus, Executor, JobRegistry};
use tokio::sync::{watch, RwLock};

use crate::binding::Binding;
use crate::config::BindingConfig;

pub struct Bindings {
    executor: Arc<dyn Executor>,
    registry: Arc<dyn JobRegistry>,
    status: watch::Receiver<CompilationStatus>,
    config: BindingConfig,
    bindings: RwLock<HashMap<AnalysisKind, Arc<Binding>>>,
}

impl Bindings {
    pub fn new(
        executor: Arc<dyn Executor>,
        registry: Arc<dyn JobRegistry>,
        status: watch::Receiver<CompilationStatus>,
        config: BindingConfig,
    ) -> Self {
        Self {
            executor,
            registry,
            status,
            config,
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Return the binding for `kind`, starting it on first use.
    pub async fn get_or_create(&self, kind: AnalysisKind) -> Arc<Binding> {
        if let Some(binding) = self.bindings.read().await.get(&kind) {
            return Arc::clone(binding);
        }

        let mut bindings = self.bindings.write().await;
        // Another caller may have created it while we waited for the lock.
        if let Some(binding) = bindings.get(&kind) {
            return Arc::clone(binding);
        }

        let binding = Binding::spawn(
            kind,
            Arc::clone(&self.executor),
            Arc::clone(&self.registry),
            self.status.clone(),
            self.config.clone(),
        );
        bindings.insert(kind, Arc::clone(&binding));
        binding
    }

    pub async fn get(&self, kind: AnalysisKind) -> Option<Arc<Binding>> {
        self.bindings.read().await.get(&kind).cloned()
    }

    /// Kinds with a running binding.
    pub async fn kinds(&self) -> Vec<AnalysisKind> {
        self.bindings.read().await.keys().copied().collect()
    }

    /// Stop and forget the binding for `kind`.
    pub async fn remove(&self, kind: AnalysisKind) -> bool {
        let removed = self.bindings.write().await.remove(&kind);
        match removed {
            Some(binding) => {
                binding.shutdown().await;
                true
            }
            None => false,
        }
    }

    pub async fn shutdown_all(&self) {
        let bindings: Vec<_> = self.bindings.write().await.drain().map(|(_, b)| b).collect();
        tracing::info!(count = bindings.len(), "Shutting down all bindings");
        for binding in bindings {
            binding.shutdown().await;
        }
    }
}
