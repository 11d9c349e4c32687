//! Case execution engine
//!
//! Builds per-case commands and dispatches them to a bounded worker pool.

mod command;
mod dispatch;

pub use command::CaseCommand;
pub use dispatch::{resolve_jobs, tally, ExecutionDispatcher, ExecutionResult};
