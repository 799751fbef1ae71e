use std::sync::Arc;

use nw_config::AnalyzerConfig;
use nw_core::analyzer::run_sweep;
use nw_core::store::Store;

use crate::epoch_now;

/// Drive expiry and the evaluation sweep until the feed is exhausted and
/// the window has fully drained.
///
/// The loop blocks on `new_log` while there is nothing to do, expires aged
/// entries on every pass, and runs a full sweep no more often than the
/// configured interval. The inter-pass sleep happens outside the lock.
pub(crate) fn run_analyzer(store: Arc<Store>, config: AnalyzerConfig) -> anyhow::Result<()> {
    let sweep_secs = config.sweep_interval.as_duration().as_secs() as i64;
    let tick = config.idle_tick.as_duration();
    let mut last_sweep: i64 = 0;

    loop {
        let mut main = store.main_state();
        while main.is_log_empty() && !main.ingestion_done() {
            main = store.wait_new_log(main);
        }

        if main.ingestion_done() && main.is_log_empty() {
            store.signal_analyzer_done(&mut main);
            drop(main);
            break;
        }

        let now = epoch_now();

        let expired = store.expire_old_logs(&mut main, now);
        if expired > 0 {
            nw_debug!(sweep, expired, live = main.log_len(), "expired aged entries");
        }

        if now - last_sweep >= sweep_secs {
            let report = run_sweep(&store, &mut main, now);
            if report.alerts_emitted > 0 {
                nw_info!(
                    sweep,
                    users = report.users_evaluated,
                    ips = report.ips_evaluated,
                    alerts = report.alerts_emitted,
                    "sweep emitted alerts"
                );
            } else {
                nw_debug!(
                    sweep,
                    users = report.users_evaluated,
                    ips = report.ips_evaluated,
                    removed = report.users_removed + report.ips_removed,
                    "sweep complete"
                );
            }
            last_sweep = now;
        }

        drop(main);
        std::thread::sleep(tick);
    }

    nw_info!(sweep, "feed drained, analyzer stopping");
    Ok(())
}
