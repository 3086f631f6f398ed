//! Enumerations used across the pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which 3D reconstruction backend to dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// COLMAP multi-step CLI (feature extraction through undistortion).
    #[default]
    Colmap,
    /// Agisoft Metashape driven by a generated Python script.
    Metashape,
    /// RealityScan headless CLI with built-in registration export.
    RealityScan,
}

impl BackendKind {
    /// Display name used in logs and reports.
    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Colmap => "COLMAP",
            BackendKind::Metashape => "Metashape",
            BackendKind::RealityScan => "RealityScan",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "colmap" => Ok(BackendKind::Colmap),
            "metashape" => Ok(BackendKind::Metashape),
            "realityscan" => Ok(BackendKind::RealityScan),
            other => Err(format!(
                "unknown backend '{}' (expected colmap, metashape or realityscan)",
                other
            )),
        }
    }
}
