//! Reactive binding core.
//!
//! A [`Binding`] keeps the results of one analysis kind in sync with its
//! input: edits are debounced, submitted to the remote [`Executor`], the
//! resulting job is looked up in the [`JobRegistry`] and its progress is
//! projected into [`Results`]. Results of a superseded input are never
//! published.
//!
//! [`Executor`]: livecheck_core::Executor
//! [`JobRegistry`]: livecheck_core::JobRegistry
//! [`Results`]: livecheck_core::Results

pub mod binding;
pub mod bindings;
pub mod cell;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generation;
pub mod pipeline;
pub mod projector;
pub mod resolver;

pub use binding::Binding;
pub use bindings::Bindings;
pub use cell::{ActiveJob, ResultsCell};
pub use config::BindingConfig;
pub use error::{BindingError, ResolveError};
pub use projector::ProjectOutcome;
