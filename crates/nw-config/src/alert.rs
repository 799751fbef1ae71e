use std::path::PathBuf;

use serde::Deserialize;

/// Alert output destinations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// File that critical alerts are appended to. Truncated at startup.
    pub critical_log: PathBuf,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            critical_log: PathBuf::from("alert_log.txt"),
        }
    }
}
