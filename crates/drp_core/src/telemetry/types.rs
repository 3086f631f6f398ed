//! Telemetry data types.

/// One timestamped GPS sample recovered from a telemetry log.
///
/// A fix is valid only when both latitude and longitude were recovered
/// from its log block. Altitude defaults to 0, which downstream geotag
/// encoding treats as "no altitude tag".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GpsFix {
    /// Signed decimal degrees, north positive.
    pub latitude: f64,
    /// Signed decimal degrees, east positive.
    pub longitude: f64,
    /// Meters above the reference datum; 0 means absent.
    pub altitude: f64,
    /// Seconds since the start of the telemetry log.
    pub timestamp: f64,
    /// Whether coordinates were recovered.
    pub valid: bool,
}

impl GpsFix {
    /// The invalid sentinel returned when no fix is available.
    pub fn invalid() -> Self {
        Self::default()
    }
}
