//! Per-run logging.
//!
//! Every pipeline run gets a `RunLogger` that writes each line to a log
//! file, forwards it to an optional caller-supplied sink (a GUI log
//! view, stdout, a test collector), and keeps a bounded tail buffer for
//! error diagnosis. External tool output is streamed through the same
//! logger so the caller sees live progress.

pub mod run_logger;
pub mod types;

pub use run_logger::RunLogger;
pub use types::{LineCallback, LogConfig, LogLevel, MessagePrefix};
