//! End-of-run summary data. Rendering is the CLI's concern; this module
//! only snapshots the aggregate state.

use crate::score::Severity;
use crate::store::Store;

/// Aggregate view of a finished (or running) pipeline.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub total_logs: u64,
    pub total_alerts: u64,
    pub alerts_dropped: u64,
    /// Users whose most recent evaluation scored above zero.
    pub active_users: usize,
    /// Source IPs with failed logins still in the window.
    pub active_ips: usize,
    /// Up to five highest-scoring users, descending.
    pub top_users: Vec<TopUser>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUser {
    pub user_id: u32,
    pub score: u32,
    pub severity: Severity,
}

impl Store {
    /// Snapshot the aggregate state for the final dashboard.
    pub fn dashboard_snapshot(&self) -> DashboardSnapshot {
        let main = self.main_state();

        let mut scored: Vec<TopUser> = main
            .users()
            .filter(|u| u.current_score > 0)
            .map(|u| TopUser {
                user_id: u.user_id,
                score: u.current_score,
                severity: Severity::from_score(u.current_score),
            })
            .collect();
        scored.sort_by(|a, b| b.score.cmp(&a.score).then(a.user_id.cmp(&b.user_id)));

        let active_users = scored.len();
        scored.truncate(5);

        let active_ips = {
            let ips = self.ip_index();
            ips.values().filter(|s| s.failed_attempts > 0).count()
        };

        DashboardSnapshot {
            total_logs: main.total_logs(),
            total_alerts: main.total_alerts(),
            alerts_dropped: main.alerts_dropped(),
            active_users,
            active_ips,
            top_users: scored,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
