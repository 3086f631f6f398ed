//! Concrete pipeline stages.

mod extract;
mod reconstruct;
mod report;

pub use extract::ExtractStep;
pub use reconstruct::ReconstructStep;
pub use report::{build_report, write_report, ReportStep, REPORT_FILENAME};
