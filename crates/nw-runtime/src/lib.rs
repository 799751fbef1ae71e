#[macro_use]
mod log_macros;

pub mod error;
pub mod lifecycle;
pub mod tracing_init;

mod alert_task;
mod analyzer_task;
mod ingest_task;
mod render;

/// Wall-clock seconds since the epoch. The only place the runtime reads
/// the clock; the core takes `now` as a parameter everywhere.
pub(crate) fn epoch_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
