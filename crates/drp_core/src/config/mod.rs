//! Configuration management.

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ExtractionSettings, LoggingSettings, PathSettings, Settings, ToolSettings,
};
