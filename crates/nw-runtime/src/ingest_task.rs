use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use nw_config::InputConfig;
use nw_core::event;
use nw_core::store::Store;

use crate::epoch_now;

/// Read the input feed into the store until EOF.
///
/// Always flips `ingestion_done` on the way out — success or failure — so
/// the analyzer and the alert sink can still drain and exit.
pub(crate) fn run_ingestion(store: Arc<Store>, config: InputConfig) -> anyhow::Result<()> {
    let result = ingest_file(&store, &config);
    store.signal_ingestion_done();
    result
}

fn ingest_file(store: &Store, config: &InputConfig) -> anyhow::Result<()> {
    let path = config.path.as_path();
    if !path.exists() && config.synthesize_missing {
        nw_info!(ingest, path = %path.display(), "input missing, synthesizing a test feed");
        synthesize_feed(path)?;
    }

    let file = File::open(path).with_context(|| format!("open input {}", path.display()))?;
    let delay = config.entry_delay.as_duration();

    let mut accepted = 0u64;
    let mut discarded = 0u64;
    for line in BufReader::new(file).lines() {
        let line = line.context("read input line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match event::parse_line(trimmed) {
            Ok(entry) => {
                store.push_log(entry);
                accepted += 1;
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            Err(e) => {
                discarded += 1;
                nw_debug!(ingest, error = %e, "discarding malformed line");
            }
        }
    }

    nw_info!(ingest, accepted, discarded, "input exhausted");
    Ok(())
}

/// Fallback feed: ten minutes of synthetic traffic across five users,
/// touching every event type with a 25% failure rate.
fn synthesize_feed(path: &Path) -> anyhow::Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create test feed {}", path.display()))?;

    let base = epoch_now() - 600;
    for i in 0..100i64 {
        let event_type = match i % 3 {
            0 => "LOGIN",
            1 => "FILE_ACCESS",
            _ => "API_CALL",
        };
        let status = if i % 4 == 0 { "FAILED" } else { "SUCCESS" };
        writeln!(
            file,
            "{}, {}, 192.168.1.{}, {}, res_{}, {}",
            base + i * 2,
            i % 5 + 100,
            i % 10 + 1,
            event_type,
            i % 2 + 1,
            status,
        )?;
    }

    Ok(())
}
