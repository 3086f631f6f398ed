//! External process execution and tool discovery.

pub mod runner;
pub mod tools;

pub use runner::{CommandRunner, RunnerError};
pub use tools::resolve_tool;
