//! Library half of the `livecheck-watch` binary.

pub mod command;
pub mod config;
