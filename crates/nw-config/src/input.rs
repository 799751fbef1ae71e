use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::HumanDuration;

/// Event feed source. All fields have defaults so the entire `[input]`
/// section may be omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Path to the event log file, one event per line.
    pub path: PathBuf,
    /// When `path` does not exist, write a small synthetic feed there
    /// instead of failing.
    pub synthesize_missing: bool,
    /// Artificial per-entry delay to simulate a live feed. `"0s"` replays
    /// the file as fast as it parses.
    pub entry_delay: HumanDuration,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("sample_logs.txt"),
            synthesize_missing: true,
            entry_delay: Duration::from_millis(10).into(),
        }
    }
}
