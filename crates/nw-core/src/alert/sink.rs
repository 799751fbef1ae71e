use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{Local, TimeZone};
use orion_error::StructError;

use crate::error::{CoreError, CoreReason, CoreResult};
use crate::score::Severity;

use super::AlertItem;

/// An alert output destination.
///
/// Sinks run on the alert thread, outside any store lock; a failing sink
/// is reported and skipped without affecting delivery to the others.
pub trait AlertSink: Send {
    /// Whether this sink wants alerts of the given severity.
    fn wants(&self, severity: Severity) -> bool {
        let _ = severity;
        true
    }

    fn emit(&mut self, item: &AlertItem) -> CoreResult<()>;
}

// ---------------------------------------------------------------------------
// CriticalFileSink
// ---------------------------------------------------------------------------

/// Persists critical alerts as one formatted text line each:
///
/// ```text
/// [2026-02-16 09:00:00] User: 104 | IP: 99.1.1.1 | Score: 550 | Severity: CRITICAL THREAT
/// ```
///
/// The `User:` field is omitted for IP-level alerts. The file is truncated
/// when the sink is opened, at process start.
pub struct CriticalFileSink {
    writer: BufWriter<File>,
}

impl CriticalFileSink {
    pub fn create(path: impl AsRef<Path>) -> CoreResult<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path.as_ref())
            .map_err(|e| {
                sink_err(format!("open {}: {e}", path.as_ref().display()))
            })?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn render_line(item: &AlertItem) -> String {
        let stamp = match Local.timestamp_opt(item.timestamp, 0).single() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => item.timestamp.to_string(),
        };

        let mut line = format!("[{stamp}] ");
        if let Some(user) = item.user {
            line.push_str(&format!("User: {user} | "));
        }
        line.push_str(&format!(
            "IP: {} | Score: {} | Severity: {}",
            item.ip_address, item.score, item.severity
        ));
        line
    }
}

impl AlertSink for CriticalFileSink {
    fn wants(&self, severity: Severity) -> bool {
        severity >= Severity::Critical
    }

    fn emit(&mut self, item: &AlertItem) -> CoreResult<()> {
        let line = Self::render_line(item);
        self.writer
            .write_all(line.as_bytes())
            .map_err(|e| sink_err(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| sink_err(e.to_string()))?;
        self.writer.flush().map_err(|e| sink_err(e.to_string()))?;
        Ok(())
    }
}

fn sink_err(detail: String) -> CoreError {
    StructError::from(CoreReason::AlertSink).with_detail(detail)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn critical_item(user: Option<u32>) -> AlertItem {
        AlertItem {
            user,
            ip_address: "192.168.1.20".to_string(),
            score: 240,
            severity: Severity::Critical,
            timestamp: 1_708_069_200,
        }
    }

    #[test]
    fn wants_only_critical() {
        let dir = tempfile::tempdir().unwrap();
        let sink = CriticalFileSink::create(dir.path().join("alerts.txt")).unwrap();
        assert!(!sink.wants(Severity::Normal));
        assert!(!sink.wants(Severity::Suspicious));
        assert!(!sink.wants(Severity::High));
        assert!(sink.wants(Severity::Critical));
    }

    #[test]
    fn writes_formatted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.txt");

        let mut sink = CriticalFileSink::create(&path).unwrap();
        sink.emit(&critical_item(Some(101))).unwrap();
        sink.emit(&critical_item(None)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        assert!(lines[0].starts_with('['));
        assert!(lines[0].contains("User: 101 | IP: 192.168.1.20"));
        assert!(lines[0].ends_with("Score: 240 | Severity: CRITICAL THREAT"));

        // IP-level alerts omit the user field entirely.
        assert!(!lines[1].contains("User:"));
        assert!(lines[1].contains("IP: 192.168.1.20"));
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.txt");
        std::fs::write(&path, "stale contents\n").unwrap();

        let _sink = CriticalFileSink::create(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }
}
