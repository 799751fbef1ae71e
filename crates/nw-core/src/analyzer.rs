//! Entity evaluation and the periodic full sweep.
//!
//! A sweep scores every tracked user, then every tracked IP (taking the IP
//! index lock nested inside the already-held main lock), enqueues alerts
//! for entities that crossed a threshold with a changed score, and finally
//! collects entities whose counters have drained to zero.

use tracing::debug;

use crate::alert::AlertItem;
use crate::score::{
    self, Severity, THRESH_DISTINCT_IPS, THRESH_DISTINCT_RESOURCES, THRESH_FAILED_LOGINS,
};
use crate::store::{IpStats, MainState, Store, UserStats};

/// Counters from one full evaluation sweep.
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub users_evaluated: usize,
    pub ips_evaluated: usize,
    pub alerts_emitted: usize,
    pub users_removed: usize,
    pub ips_removed: usize,
}

/// Run one full evaluation sweep.
///
/// Must be called with the main guard held. Alerts are enqueued in
/// evaluation order — users first, then IPs — and re-running the sweep on
/// an unchanged store emits nothing (de-duplication by score equality).
pub fn run_sweep(store: &Store, main: &mut MainState, now: i64) -> SweepReport {
    let mut report = SweepReport::default();
    let mut emitted: Vec<AlertItem> = Vec::new();

    for user in main.users_mut() {
        report.users_evaluated += 1;
        if let Some(item) = evaluate_user(user, now) {
            emitted.push(item);
        }
    }
    report.users_removed = main.remove_idle_users();

    {
        let mut ips = store.ip_index();
        for stats in ips.values_mut() {
            report.ips_evaluated += 1;
            if let Some(item) = evaluate_ip(stats, now) {
                emitted.push(item);
            }
        }
        report.ips_removed = ips.remove_idle();
    }

    report.alerts_emitted = emitted.len();
    main.count_alerts(emitted.len() as u64);
    for item in emitted {
        store.push_alert(main, item);
    }

    report
}

/// Score one user and decide whether to alert.
///
/// `current_score` is refreshed unconditionally; the alert fires only when
/// a threshold is met, the severity is at least [`Severity::Suspicious`],
/// and the score differs from the one last alerted on.
fn evaluate_user(user: &mut UserStats, now: i64) -> Option<AlertItem> {
    let resources = user.resources.distinct();
    let ips = user.ip_refs.distinct();
    let score = score::compute_user_score(user);
    user.current_score = score;

    debug!(
        user = user.user_id,
        score,
        failed = user.failed_attempts,
        resources,
        ips,
        last_alert = user.last_alert_score,
        "user evaluated"
    );

    let threshold_met = user.failed_attempts >= THRESH_FAILED_LOGINS
        || resources >= THRESH_DISTINCT_RESOURCES
        || ips >= THRESH_DISTINCT_IPS;
    if !threshold_met {
        return None;
    }

    let severity = Severity::from_score(score);
    if severity < Severity::Suspicious {
        debug!(user = user.user_id, score, "below alert severity, suppressed");
        return None;
    }
    if score == user.last_alert_score {
        debug!(
            user = user.user_id,
            score, "rollup unchanged since last alert, suppressed"
        );
        return None;
    }

    user.last_alert_score = score;
    user.last_alert_time = now;
    Some(AlertItem {
        user: Some(user.user_id),
        ip_address: user.ip_refs.first().unwrap_or("0.0.0.0").to_string(),
        score,
        severity,
        timestamp: now,
    })
}

/// Score one source IP and decide whether to alert, under the same
/// de-duplication rule as users.
fn evaluate_ip(stats: &mut IpStats, now: i64) -> Option<AlertItem> {
    if stats.failed_attempts < THRESH_FAILED_LOGINS {
        return None;
    }

    let score = score::compute_ip_score(stats);
    let severity = Severity::from_score(score);

    debug!(
        ip = %stats.ip_address,
        failed = stats.failed_attempts,
        score,
        last_alert = stats.last_alert_score,
        "ip evaluated"
    );

    if severity < Severity::Suspicious || score == stats.last_alert_score {
        return None;
    }

    stats.last_alert_score = score;
    stats.last_alert_time = now;
    Some(AlertItem {
        user: None,
        ip_address: stats.ip_address.clone(),
        score,
        severity,
        timestamp: now,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
