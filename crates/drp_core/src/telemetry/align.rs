//! Frame-to-fix temporal alignment.

use super::types::GpsFix;

/// Return the fix temporally nearest to `timestamp`.
///
/// Ties resolve to the earliest-encountered minimum. An empty sequence
/// yields the invalid sentinel rather than an error, so per-frame
/// embedding can simply skip frames with no fix.
///
/// Linear scan: telemetry sequences are bounded by log duration at a
/// fixed sample rate, so there is nothing to gain from an index.
pub fn nearest_fix(fixes: &[GpsFix], timestamp: f64) -> GpsFix {
    let mut best: Option<&GpsFix> = None;
    let mut best_diff = f64::INFINITY;

    for fix in fixes {
        let diff = (fix.timestamp - timestamp).abs();
        if diff < best_diff {
            best_diff = diff;
            best = Some(fix);
        }
    }

    best.copied().unwrap_or_else(GpsFix::invalid)
}
