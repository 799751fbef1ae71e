use crate::watch::WatchConfig;

/// Reject configurations that would stall or wedge the pipeline.
pub(crate) fn validate(config: &WatchConfig) -> anyhow::Result<()> {
    if config.input.path.as_os_str().is_empty() {
        anyhow::bail!("input.path must not be empty");
    }

    if config.analyzer.window.is_zero() {
        anyhow::bail!("analyzer.window must be greater than zero");
    }
    if config.analyzer.sweep_interval.is_zero() {
        anyhow::bail!("analyzer.sweep_interval must be greater than zero");
    }
    if config.analyzer.idle_tick.is_zero() {
        anyhow::bail!("analyzer.idle_tick must be greater than zero");
    }
    if config.analyzer.sweep_interval.as_duration() > config.analyzer.window.as_duration() {
        anyhow::bail!(
            "analyzer.sweep_interval ({}) exceeds analyzer.window ({}); \
             entries would expire without ever being evaluated",
            config.analyzer.sweep_interval,
            config.analyzer.window,
        );
    }

    if config.alert.critical_log.as_os_str().is_empty() {
        anyhow::bail!("alert.critical_log must not be empty");
    }

    Ok(())
}
