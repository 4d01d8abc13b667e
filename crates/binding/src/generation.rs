//! Default-input generation.

use livecheck_core::{AnalysisKind, CoreError, Executor, Input};
use tokio::sync::watch;

use crate::error::BindingError;

/// Ask the executor for a fresh input and check it belongs to `kind`.
pub async fn fetch(executor: &dyn Executor, kind: AnalysisKind) -> Result<Input, BindingError> {
    let input = executor.generate(kind).await?;
    if input.analysis() != kind {
        return Err(CoreError::KindMismatch {
            expected: kind,
            actual: input.analysis(),
        }
        .into());
    }
    Ok(input)
}

/// Generate an input and make it the binding's current input.
///
/// The write goes through the input cell like a user edit, so the
/// generated input is dispatched like any other.
pub async fn generate(
    executor: &dyn Executor,
    kind: AnalysisKind,
    input_tx: &watch::Sender<Option<Input>>,
) -> Result<Input, BindingError> {
    let input = fetch(executor, kind).await?;
    tracing::info!(analysis = %kind, input_hash = %input.hash(), "Generated input");
    input_tx.send_replace(Some(input.clone()));
    Ok(input)
}

/// Seed an empty input cell with a generated default.
///
/// An input written while generation was in progress wins.
pub async fn generate_default(
    executor: &dyn Executor,
    kind: AnalysisKind,
    input_tx: &watch::Sender<Option<Input>>,
) {
    match fetch(executor, kind).await {
        Ok(input) => {
            let seeded = input_tx.send_if_modified(|current| {
                if current.is_some() {
                    return false;
                }
                *current = Some(input);
                true
            });
            tracing::debug!(analysis = %kind, seeded, "Default input generated");
        }
        Err(e) => {
            tracing::warn!(analysis = %kind, error = %e, "Failed to generate default input");
        }
    }
}
