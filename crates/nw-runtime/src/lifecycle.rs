use std::sync::Arc;
use std::thread::{self, JoinHandle};

use orion_error::compat_prelude::*;
use orion_error::op_context;
use orion_error::prelude::*;

use nw_config::WatchConfig;
use nw_core::alert::{AlertSink, CriticalFileSink};
use nw_core::store::{Progress, Store};

use crate::alert_task;
use crate::analyzer_task;
use crate::error::{RuntimeReason, RuntimeResult};
use crate::ingest_task;
use crate::render::ConsoleSink;

// ---------------------------------------------------------------------------
// Worker — named thread handle
// ---------------------------------------------------------------------------

struct Worker {
    name: &'static str,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Worker {
    fn spawn(
        name: &'static str,
        body: impl FnOnce() -> anyhow::Result<()> + Send + 'static,
    ) -> RuntimeResult<Self> {
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(body)
            .map_err(|e| {
                StructError::from(RuntimeReason::Bootstrap)
                    .with_detail(format!("spawn {name} thread: {e}"))
            })?;
        Ok(Self { name, handle })
    }

    fn join(self) -> RuntimeResult<()> {
        self.handle
            .join()
            .map_err(|_| {
                StructError::from(RuntimeReason::Shutdown)
                    .with_detail(format!("{} thread panicked", self.name))
            })?
            .owe(RuntimeReason::Shutdown)
    }
}

// ---------------------------------------------------------------------------
// Pipeline — the top-level lifecycle handle
// ---------------------------------------------------------------------------

/// Owns the shared [`Store`] and the three worker threads.
///
/// Workers are spawned in start order — alert sink → analyzer → ingestion —
/// and joined in reverse (LIFO) during [`wait`](Self::wait). Shutdown is
/// cooperative and flows the other way: ingestion exits at EOF and raises
/// `ingestion_done`, the analyzer drains the window and raises
/// `analyzer_done`, and the alert sink flushes the queue and exits, so the
/// LIFO join order always terminates.
pub struct Pipeline {
    store: Arc<Store>,
    workers: Vec<Worker>,
}

impl Pipeline {
    /// Bootstrap with the standard sinks: console blocks for every alert
    /// plus the critical-alert file from the config (truncated here, at
    /// startup).
    pub fn start(config: WatchConfig) -> RuntimeResult<Self> {
        let critical =
            CriticalFileSink::create(&config.alert.critical_log).owe(RuntimeReason::Bootstrap)?;
        let sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(ConsoleSink), Box::new(critical)];
        Self::start_with_sinks(config, sinks)
    }

    /// Bootstrap with caller-provided sinks. Integration tests inject a
    /// capturing sink here.
    pub fn start_with_sinks(
        config: WatchConfig,
        sinks: Vec<Box<dyn AlertSink>>,
    ) -> RuntimeResult<Self> {
        let mut op = op_context!("pipeline-bootstrap").with_auto_log();
        op.record("input", config.input.path.display().to_string().as_str());

        let store = Arc::new(Store::new(&config.analyzer));
        let mut workers = Vec::with_capacity(3);

        let alert_store = Arc::clone(&store);
        workers.push(Worker::spawn("alert", move || {
            alert_task::run_alert_sink(alert_store, sinks)
        })?);

        let analyzer_store = Arc::clone(&store);
        let analyzer_config = config.analyzer.clone();
        workers.push(Worker::spawn("analyzer", move || {
            analyzer_task::run_analyzer(analyzer_store, analyzer_config)
        })?);

        let ingest_store = Arc::clone(&store);
        let input_config = config.input.clone();
        workers.push(Worker::spawn("ingestion", move || {
            ingest_task::run_ingestion(ingest_store, input_config)
        })?);

        nw_info!(
            sys,
            window_secs = store.window_secs(),
            input = %config.input.path.display(),
            "pipeline started"
        );
        op.mark_suc();
        Ok(Self { store, workers })
    }

    /// Shared store handle, for progress supervision and the dashboard.
    pub fn store(&self) -> Arc<Store> {
        Arc::clone(&self.store)
    }

    /// Coarse progress snapshot for the supervising thread.
    pub fn progress(&self) -> Progress {
        self.store.progress()
    }

    /// Join every worker, last-started first, returning the first failure.
    pub fn wait(mut self) -> RuntimeResult<()> {
        while let Some(worker) = self.workers.pop() {
            let name = worker.name;
            nw_debug!(sys, worker = name, "waiting for worker");
            worker.join()?;
            nw_debug!(sys, worker = name, "worker finished");
        }
        nw_info!(sys, "pipeline stopped");
        Ok(())
    }
}
