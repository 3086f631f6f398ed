//! Drone telemetry subsystem.
//!
//! Parses the subtitle-style GPS log recorded alongside a drone video
//! into a chronological sequence of fixes, and aligns frame timestamps
//! to the temporally nearest fix.

pub mod align;
pub mod parser;
pub mod types;

pub use align::nearest_fix;
pub use parser::{parse_telemetry, parse_telemetry_file};
pub use types::GpsFix;
