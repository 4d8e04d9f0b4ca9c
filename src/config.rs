//! Monitor configuration

use crate::error::{Result, WatchError};
use crate::types::FilterState;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Settings for the log monitor's refresh driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between background refreshes (default: 30)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Fetch once as soon as polling starts (default: true)
    #[serde(default = "default_refresh_on_start")]
    pub refresh_on_start: bool,

    /// Filters in effect before the user changes anything
    #[serde(default)]
    pub initial_filters: FilterState,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_refresh_on_start() -> bool {
    true
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            refresh_on_start: default_refresh_on_start(),
            initial_filters: FilterState::default(),
        }
    }
}

impl MonitorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MonitorConfig = toml::from_str(content)
            .map_err(|e| WatchError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, or defaults when the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            WatchError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            poll_interval_secs = config.poll_interval_secs,
            "Config loaded"
        );
        Ok(config)
    }

    /// Reject settings the driver cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            return Err(WatchError::Config(
                "poll_interval_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
