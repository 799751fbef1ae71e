use std::time::Duration;

use serde::Deserialize;

use crate::types::HumanDuration;

/// Analyzer cadence and window geometry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Rolling window length. Entries older than this relative to the
    /// current clock are expired from the log and from every rollup.
    pub window: HumanDuration,
    /// Minimum interval between two full evaluation sweeps.
    pub sweep_interval: HumanDuration,
    /// Cooperative sleep between analyzer loop iterations.
    pub idle_tick: HumanDuration,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(300).into(),
            sweep_interval: Duration::from_secs(2).into(),
            idle_tick: Duration::from_millis(500).into(),
        }
    }
}
