//! Terminal banner and final dashboard rendering.

use nw_core::dashboard::DashboardSnapshot;
use nw_core::score::Severity;

const RESET: &str = "\x1b[0m";
const CYAN_BOLD: &str = "\x1b[1;36m";
const MAGENTA_BOLD: &str = "\x1b[1;35m";

pub fn print_banner() {
    println!("{MAGENTA_BOLD}");
    println!("╔════════════════════════════════════════════════╗");
    println!("║          NIGHTWATCH ANOMALY DETECTION          ║");
    println!("╚════════════════════════════════════════════════╝{RESET}");
    println!();
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[1;31m",
        Severity::High => "\x1b[31m",
        Severity::Suspicious => "\x1b[33m",
        Severity::Normal => "\x1b[0m",
    }
}

pub fn print_dashboard(snapshot: &DashboardSnapshot) {
    println!("\n{CYAN_BOLD}");
    println!("┌─────────────────────────────────────────────┐");
    println!("│         FINAL ANALYSIS DASHBOARD            │");
    println!("├─────────────────────────────────────────────┤");
    println!("│ Total logs processed: {:<21} │", snapshot.total_logs);
    println!("│ Alerts generated:     {:<21} │", snapshot.total_alerts);
    if snapshot.alerts_dropped > 0 {
        println!("│ Alerts dropped:       {:<21} │", snapshot.alerts_dropped);
    }
    println!(
        "│ Active entities:      {:<21} │",
        snapshot.active_users + snapshot.active_ips
    );
    println!("├─────────────────────────────────────────────┤");
    println!("│         TOP SUSPICIOUS ENTITIES             │");
    println!("├─────────────────────────────────────────────┤");
    for top in &snapshot.top_users {
        let color = severity_color(top.severity);
        println!(
            "│ {color}User {:<7} Score: {:<5} {:<15}{CYAN_BOLD} │",
            top.user_id,
            top.score,
            top.severity.label(),
        );
    }
    println!("└─────────────────────────────────────────────┘{RESET}");
    println!();
}
