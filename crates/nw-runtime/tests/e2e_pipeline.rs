//! End-to-end pipeline integration tests.
//!
//! Each test writes a feed file, runs the full three-thread pipeline with
//! a capturing alert sink and fast cadence settings, waits for the
//! cooperative shutdown to drain all three stages, and asserts on what
//! came out the other side.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use nw_config::WatchConfig;
use nw_core::alert::{AlertItem, AlertSink, CriticalFileSink};
use nw_core::error::CoreResult;
use nw_core::score::Severity;
use nw_datagen::scenario::{self, ScenarioConfig};
use nw_runtime::lifecycle::Pipeline;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Collects every alert the pipeline emits.
#[derive(Clone, Default)]
struct CaptureSink {
    seen: Arc<Mutex<Vec<AlertItem>>>,
}

impl CaptureSink {
    fn items(&self) -> Vec<AlertItem> {
        self.seen.lock().unwrap().clone()
    }
}

impl AlertSink for CaptureSink {
    fn emit(&mut self, item: &AlertItem) -> CoreResult<()> {
        self.seen.lock().unwrap().push(item.clone());
        Ok(())
    }
}

fn epoch_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Fast-cadence config: zero replay delay, a short window so the run
/// drains within seconds, a sweep every second.
fn test_config(dir: &Path, feed: &Path, window: &str) -> WatchConfig {
    let mut config = WatchConfig::default();
    config.input.path = feed.to_path_buf();
    config.input.synthesize_missing = false;
    config.input.entry_delay = Duration::ZERO.into();
    config.analyzer.window = window.parse().unwrap();
    config.analyzer.sweep_interval = "1s".parse().unwrap();
    config.analyzer.idle_tick = "50ms".parse().unwrap();
    config.alert.critical_log = dir.join("alert_log.txt");
    config
}

fn write_feed(path: &Path, lines: &[String]) {
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

// ---------------------------------------------------------------------------
// 1. Brute force: user alert, IP alert, critical file line
// ---------------------------------------------------------------------------

#[test]
fn brute_force_feed_alerts_user_ip_and_critical_file() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("feed.txt");
    let now = epoch_now();

    let mut lines = vec!["# brute force run".to_string()];
    for _ in 0..80 {
        lines.push(format!("{now}, 101, 192.168.1.20, LOGIN, -, FAILED"));
    }
    // A malformed line and a blank one must be skipped silently.
    lines.push("not, a, valid, line".to_string());
    lines.push(String::new());
    write_feed(&feed, &lines);

    // The window outlives the run comfortably, so the alerting sweep always
    // sees the full rollup before expiry drains it.
    let config = test_config(dir.path(), &feed, "10s");
    let critical_log = config.alert.critical_log.clone();

    let capture = CaptureSink::default();
    let critical = CriticalFileSink::create(&critical_log).unwrap();
    let sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(capture.clone()), Box::new(critical)];

    let pipeline = Pipeline::start_with_sinks(config, sinks).unwrap();
    let store = pipeline.store();
    pipeline.wait().unwrap();

    let alerts = capture.items();
    let user_alert = alerts
        .iter()
        .find(|a| a.user == Some(101))
        .expect("user-level alert");
    assert!(user_alert.severity >= Severity::Suspicious);
    assert_eq!(user_alert.ip_address, "192.168.1.20");

    let ip_alert = alerts
        .iter()
        .find(|a| a.user.is_none())
        .expect("ip-level alert");
    assert_eq!(ip_alert.ip_address, "192.168.1.20");
    assert!(ip_alert.severity >= Severity::Suspicious);

    // All 80 valid entries were counted; the malformed one was not.
    let snapshot = store.dashboard_snapshot();
    assert_eq!(snapshot.total_logs, 80);
    assert!(snapshot.total_alerts >= 2);
    assert_eq!(snapshot.alerts_dropped, 0);

    // 80 failures score deep into the critical band, so the critical file
    // holds at least one correctly formatted line.
    let contents = std::fs::read_to_string(&critical_log).unwrap();
    let line = contents
        .lines()
        .find(|l| l.contains("User: 101"))
        .expect("critical alert line for user 101");
    assert!(line.starts_with('['));
    assert!(line.contains("IP: 192.168.1.20"));
    assert!(line.contains("| Severity: CRITICAL THREAT"));
}

// ---------------------------------------------------------------------------
// 2. Quiet traffic: the whole run stays silent
// ---------------------------------------------------------------------------

#[test]
fn quiet_feed_emits_no_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("feed.txt");
    let now = epoch_now();

    // 20 users, one IP and a 3-resource pool each, a failure rate around
    // 5% that never lands twice on the same user.
    let mut lines = Vec::new();
    for i in 0..200u32 {
        let user = i % 20 + 1;
        let ip = format!("10.0.0.{}", user % 10 + 1);
        let resource = format!("res_{}_{}", user, i % 6);
        let (event, status) = if i % 19 == 0 {
            ("LOGIN", "FAILED")
        } else {
            ("API_CALL", "SUCCESS")
        };
        lines.push(format!("{now}, {user}, {ip}, {event}, {resource}, {status}"));
    }
    write_feed(&feed, &lines);

    let config = test_config(dir.path(), &feed, "4s");
    let critical_log = config.alert.critical_log.clone();

    let capture = CaptureSink::default();
    let critical = CriticalFileSink::create(&critical_log).unwrap();
    let sinks: Vec<Box<dyn AlertSink>> = vec![Box::new(capture.clone()), Box::new(critical)];

    let pipeline = Pipeline::start_with_sinks(config, sinks).unwrap();
    let store = pipeline.store();
    pipeline.wait().unwrap();

    assert!(
        capture.items().is_empty(),
        "quiet traffic alerted: {:?}",
        capture.items()
    );
    assert_eq!(store.dashboard_snapshot().total_logs, 200);
    assert_eq!(std::fs::read_to_string(&critical_log).unwrap(), "");
}

// ---------------------------------------------------------------------------
// 3. Generated scenario: ingest-everything, expiry-driven shutdown
// ---------------------------------------------------------------------------

#[test]
fn datagen_scenario_drains_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("sample_logs.txt");

    // Anchor the feed a day in the past: every entry is already outside
    // the window, so the run exercises parsing, rollup unwind, and the
    // expiry-driven cooperative shutdown across all three stages.
    let scenario =
        scenario::write_to(&feed, &ScenarioConfig::default(), epoch_now() - 86_400).unwrap();

    let config = test_config(dir.path(), &feed, "2s");
    let capture = CaptureSink::default();
    let pipeline =
        Pipeline::start_with_sinks(config, vec![Box::new(capture.clone()) as Box<dyn AlertSink>])
            .unwrap();
    let store = pipeline.store();
    pipeline.wait().unwrap();

    let progress = store.progress();
    assert!(progress.ingestion_done);
    assert!(progress.analyzer_done);
    assert_eq!(progress.live_entries, 0);
    assert_eq!(store.dashboard_snapshot().total_logs, scenario.entries as u64);
}

// ---------------------------------------------------------------------------
// 4. Missing input: the synthesized fallback feed is generated and used
// ---------------------------------------------------------------------------

#[test]
fn missing_input_synthesizes_a_feed() {
    let dir = tempfile::tempdir().unwrap();
    let feed = dir.path().join("sample_logs.txt");
    assert!(!feed.exists());

    let mut config = test_config(dir.path(), &feed, "2s");
    config.input.synthesize_missing = true;

    let capture = CaptureSink::default();
    let pipeline =
        Pipeline::start_with_sinks(config, vec![Box::new(capture.clone()) as Box<dyn AlertSink>])
            .unwrap();
    let store = pipeline.store();
    pipeline.wait().unwrap();

    // The fallback feed was written next to where the input was expected
    // and fully ingested.
    assert!(feed.exists());
    assert_eq!(store.dashboard_snapshot().total_logs, 100);
}
