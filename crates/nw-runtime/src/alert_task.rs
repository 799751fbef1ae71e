use std::sync::Arc;

use nw_core::alert::AlertSink;
use nw_core::store::Store;

/// Consume the alert queue until the analyzer is done and the queue is
/// empty.
///
/// Alerts are drained in a batch under the main lock; rendering and file
/// appends happen outside it. A failing sink is logged and skipped — the
/// alert still reaches the remaining sinks.
pub(crate) fn run_alert_sink(
    store: Arc<Store>,
    mut sinks: Vec<Box<dyn AlertSink>>,
) -> anyhow::Result<()> {
    loop {
        let mut main = store.main_state();
        while !main.has_alerts() && !main.analyzer_done() {
            main = store.wait_new_alert(main);
        }
        let batch = main.drain_alerts();
        drop(main);

        for item in &batch {
            for sink in sinks.iter_mut() {
                if sink.wants(item.severity) {
                    if let Err(e) = sink.emit(item) {
                        nw_error!(alert, error = %e, "alert sink write failed");
                    }
                }
            }
        }
        if !batch.is_empty() {
            nw_debug!(alert, delivered = batch.len(), "alert batch delivered");
        }

        let main = store.main_state();
        if main.analyzer_done() && !main.has_alerts() {
            break;
        }
    }

    nw_info!(alert, "alert queue drained, sink stopping");
    Ok(())
}
