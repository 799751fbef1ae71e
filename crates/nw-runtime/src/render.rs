//! Terminal rendering of alert blocks.

use nw_core::alert::{AlertItem, AlertSink};
use nw_core::error::CoreResult;
use nw_core::score::Severity;

const RESET: &str = "\x1b[0m";

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[1;31m",
        Severity::High => "\x1b[31m",
        Severity::Suspicious => "\x1b[33m",
        Severity::Normal => "\x1b[0m",
    }
}

/// Renders every alert as a framed, severity-coloured block on stdout.
pub(crate) struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn emit(&mut self, item: &AlertItem) -> CoreResult<()> {
        print!("{}", render_block(item));
        Ok(())
    }
}

fn render_block(item: &AlertItem) -> String {
    let color = severity_color(item.severity);
    let mut out = format!("\n{color}");
    out.push_str("╔════════════════════════════════════════════╗\n");
    out.push_str("║                 ALERT                      ║\n");
    out.push_str("╠════════════════════════════════════════════╣\n");
    if let Some(user) = item.user {
        out.push_str(&format!("║ User:     {user:<30} ║\n"));
    }
    out.push_str(&format!("║ IP:       {:<30} ║\n", item.ip_address));
    out.push_str(&format!("║ Score:    {:<30} ║\n", item.score));
    out.push_str(&format!("║ Severity: {:<30} ║\n", item.severity.label()));
    out.push_str(&format!(
        "╚════════════════════════════════════════════╝{RESET}\n\n"
    ));
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
