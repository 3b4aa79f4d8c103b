use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::submission::MatchMode;
use crate::utils::file_utils;

/// Environment variable overriding the polling interval, in seconds
pub const INTERVAL_ENV: &str = "SUBMISSION_MONITOR_INTERVAL";

/// Configuration for the monitoring loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Roster definition file
    pub roster_path: PathBuf,

    /// Where the status page is written
    pub output_path: PathBuf,

    /// Seconds between scan cycles
    pub poll_interval_secs: u64,

    /// Refresh period written into the status page
    pub page_refresh_secs: u64,

    /// Stop once every student has submitted
    pub stop_when_complete: bool,

    /// Stop after this many cycles, if set
    pub max_cycles: Option<u64>,

    /// How files are matched to students
    pub matching: MatchMode,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            roster_path: PathBuf::from("class_list.txt"),
            output_path: PathBuf::from("page.html"),
            poll_interval_secs: 5,
            page_refresh_secs: 10,
            stop_when_complete: true,
            max_cycles: None,
            matching: MatchMode::default(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let content = file_utils::read_file_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;
        Ok(config)
    }

    /// Apply overrides from the environment
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = std::env::var(INTERVAL_ENV) {
            self.poll_interval_secs = v
                .trim()
                .parse()
                .with_context(|| format!("{} must be a number of seconds, got {:?}", INTERVAL_ENV, v))?;
        }
        Ok(())
    }

    /// Polling interval, never shorter than one millisecond
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs).max(Duration::from_millis(1))
    }
}
