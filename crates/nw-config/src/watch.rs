use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::alert::AlertConfig;
use crate::analyzer::AnalyzerConfig;
use crate::input::InputConfig;
use crate::logging::LoggingConfig;
use crate::validate;

// ---------------------------------------------------------------------------
// Raw TOML structure (intermediate representation)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WatchConfigRaw {
    input: InputConfig,
    analyzer: AnalyzerConfig,
    alert: AlertConfig,
    logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// WatchConfig (resolved, validated)
// ---------------------------------------------------------------------------

/// Top-level configuration for the pipeline. Every section is optional in
/// the TOML file; [`WatchConfig::default`] is a fully usable configuration.
#[derive(Debug, Clone, Default)]
pub struct WatchConfig {
    pub input: InputConfig,
    pub analyzer: AnalyzerConfig,
    pub alert: AlertConfig,
    pub logging: LoggingConfig,
}

impl WatchConfig {
    /// Read and parse a `nightwatch.toml` file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.as_ref().display()))?;
        content.parse()
    }
}

impl FromStr for WatchConfig {
    type Err = anyhow::Error;

    /// Parse a TOML string into a validated [`WatchConfig`].
    fn from_str(toml_str: &str) -> anyhow::Result<Self> {
        let raw: WatchConfigRaw = toml::from_str(toml_str)?;

        let config = WatchConfig {
            input: raw.input,
            analyzer: raw.analyzer,
            alert: raw.alert,
            logging: raw.logging,
        };

        validate::validate(&config)?;

        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
