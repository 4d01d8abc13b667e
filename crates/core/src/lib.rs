//! Shared data model for the livecheck workspace.
//!
//! Holds the wire-level types exchanged with the remote executor, the
//! [`Results`] value exposed to consumers, and the two collaborator
//! seams ([`Executor`] and [`JobRegistry`]) the binding core is written
//! against.

pub mod analysis;
pub mod compilation;
pub mod error;
pub mod executor;
pub mod io;
pub mod job;
pub mod results;
pub mod types;

pub use analysis::AnalysisKind;
pub use compilation::{CompilationStatus, CompilerState};
pub use error::{CoreError, ExecutorError};
pub use executor::{Executor, JobRegistry};
pub use io::{Hash, Input, JobMeta, Output};
pub use job::{JobId, JobRecord, JobState, Submission, ValidationResult};
pub use results::{OutputState, Results};
