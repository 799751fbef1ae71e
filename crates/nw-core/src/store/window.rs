//! Windowing: keeping the rollups in exact lockstep with the log window.
//!
//! All three operations run with the main guard held; the IP index lock is
//! taken as a nested inner lock where a failed login is involved
//! (main → IP, the store's single lock-order convention).

use crate::event::LogEntry;

use super::{MainState, Store};

impl Store {
    /// Fold one entry into the per-user and per-IP rollups. Called after
    /// the entry is accepted into the log window, under the same lock hold
    /// that inserted it.
    pub(crate) fn add_log_to_stats(&self, main: &mut MainState, entry: &LogEntry) {
        let user = main.get_or_create_user(entry.user_id);

        if entry.is_failed_login() {
            user.failed_attempts += 1;
        }
        if let Some(resource) = &entry.resource_id {
            user.resources.incr(resource);
        }
        user.ip_refs.incr(&entry.ip_address);

        if entry.is_failed_login() {
            let mut ips = self.ip_index();
            ips.get_or_create(&entry.ip_address).failed_attempts += 1;
        }
    }

    /// Exact inverse of [`add_log_to_stats`](Self::add_log_to_stats),
    /// applied immediately before an expired entry is discarded.
    ///
    /// Lookup-only: an entity whose counters already drained must not be
    /// resurrected here. Counters saturate at zero.
    pub(crate) fn remove_log_from_stats(&self, main: &mut MainState, entry: &LogEntry) {
        if let Some(user) = main.user_mut(entry.user_id) {
            if entry.is_failed_login() {
                user.failed_attempts = user.failed_attempts.saturating_sub(1);
            }
            if let Some(resource) = &entry.resource_id {
                user.resources.decr(resource);
            }
            user.ip_refs.decr(&entry.ip_address);
        }

        if entry.is_failed_login() {
            let mut ips = self.ip_index();
            if let Some(stats) = ips.get_mut(&entry.ip_address) {
                stats.failed_attempts = stats.failed_attempts.saturating_sub(1);
            }
        }
    }

    /// Expire every entry older than the window relative to `now`,
    /// unwinding its rollup contributions first. An entry exactly at the
    /// window boundary survives. Returns how many entries were expired.
    pub fn expire_old_logs(&self, main: &mut MainState, now: i64) -> usize {
        let horizon = self.window_secs();
        let mut expired = 0;

        while main
            .oldest()
            .is_some_and(|entry| now - entry.timestamp > horizon)
        {
            let Some(entry) = main.pop_oldest() else { break };
            self.remove_log_from_stats(main, &entry);
            expired += 1;
        }

        expired
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nw_config::AnalyzerConfig;

    use crate::event::{EventType, LogEntry, StatusCode};
    use crate::score::WINDOW_SECONDS;
    use crate::store::Store;

    fn store_with_window(secs: u64) -> Store {
        let mut config = AnalyzerConfig::default();
        config.window = Duration::from_secs(secs).into();
        Store::new(&config)
    }

    fn entry(
        timestamp: i64,
        user_id: u32,
        ip: &str,
        event_type: EventType,
        resource: Option<&str>,
        status: StatusCode,
    ) -> LogEntry {
        LogEntry {
            timestamp,
            user_id,
            ip_address: ip.to_string(),
            event_type,
            resource_id: resource.map(str::to_string),
            status_code: status,
        }
    }

    fn failed_login(timestamp: i64, user_id: u32, ip: &str) -> LogEntry {
        entry(timestamp, user_id, ip, EventType::Login, None, StatusCode::Failed)
    }

    // -- 1. rollups track insertions ----------------------------------------

    #[test]
    fn push_updates_user_and_ip_rollups() {
        let store = store_with_window(300);
        store.push_log(failed_login(1000, 101, "192.168.1.20"));
        store.push_log(failed_login(1001, 101, "192.168.1.20"));
        store.push_log(entry(
            1002,
            101,
            "192.168.1.21",
            EventType::FileAccess,
            Some("doc_1"),
            StatusCode::Success,
        ));

        let main = store.main_state();
        let user = main.user(101).unwrap();
        assert_eq!(user.failed_attempts, 2);
        assert_eq!(user.resources.distinct(), 1);
        assert_eq!(user.resources.count("doc_1"), 1);
        assert_eq!(user.ip_refs.distinct(), 2);
        assert_eq!(user.ip_refs.count("192.168.1.20"), 2);
        assert_eq!(main.log_len(), 3);
        assert_eq!(main.total_logs(), 3);

        let ips = store.ip_index();
        assert_eq!(ips.get("192.168.1.20").unwrap().failed_attempts, 2);
        // Successful file access never creates an IP rollup.
        assert!(ips.get("192.168.1.21").is_none());
    }

    // -- 2. add/remove round-trip -------------------------------------------

    #[test]
    fn expiry_unwinds_every_contribution() {
        let store = store_with_window(300);
        for i in 0..10 {
            store.push_log(failed_login(1000 + i, 101, "10.0.0.1"));
            let resource = format!("res_{}", i % 3);
            store.push_log(entry(
                1000 + i,
                101,
                "10.0.0.2",
                EventType::FileAccess,
                Some(resource.as_str()),
                StatusCode::Success,
            ));
        }

        let mut main = store.main_state();
        let expired = store.expire_old_logs(&mut main, 2000);
        assert_eq!(expired, 20);
        assert!(main.is_log_empty());

        // Lookup-only removal leaves the drained entity in place for the
        // sweep to collect; every counter must be exactly zero.
        let user = main.user(101).unwrap();
        assert!(user.is_idle());
        assert_eq!(user.failed_attempts, 0);
        assert_eq!(user.resources.distinct(), 0);
        assert_eq!(user.ip_refs.distinct(), 0);

        assert_eq!(store.ip_index().get("10.0.0.1").unwrap().failed_attempts, 0);
    }

    // -- 3. window boundary --------------------------------------------------

    #[test]
    fn boundary_entry_survives_one_second_past_does_not() {
        // The default horizon is the standard five-minute window.
        let store = Store::new(&AnalyzerConfig::default());
        assert_eq!(store.window_secs() as u64, WINDOW_SECONDS);

        let now = 10_000;
        store.push_log(failed_login(now - 301, 1, "10.0.0.1"));
        store.push_log(failed_login(now - 300, 2, "10.0.0.2"));
        store.push_log(failed_login(now, 3, "10.0.0.3"));

        let mut main = store.main_state();
        let expired = store.expire_old_logs(&mut main, now);
        assert_eq!(expired, 1);
        assert_eq!(main.log_len(), 2);
        assert!(main.user(1).unwrap().is_idle());
        assert!(!main.user(2).unwrap().is_idle());
    }

    // -- 4. expiry respects arrival order -----------------------------------

    #[test]
    fn expiry_stops_at_first_live_entry() {
        let store = store_with_window(100);
        for ts in [100, 200, 300, 400] {
            store.push_log(failed_login(ts, 7, "10.0.0.7"));
        }

        let mut main = store.main_state();
        assert_eq!(store.expire_old_logs(&mut main, 350), 2);
        assert_eq!(main.log_len(), 2);
        assert_eq!(main.user(7).unwrap().failed_attempts, 2);

        // A later pass with a later clock takes the rest.
        assert_eq!(store.expire_old_logs(&mut main, 1000), 2);
        assert!(main.is_log_empty());
        assert_eq!(main.user(7).unwrap().failed_attempts, 0);
    }

    // -- 5. shared resources across users stay independent -------------------

    #[test]
    fn rollups_are_per_user() {
        let store = store_with_window(300);
        store.push_log(entry(
            1000,
            1,
            "10.0.0.1",
            EventType::ApiCall,
            Some("shared"),
            StatusCode::Success,
        ));
        store.push_log(entry(
            1000,
            2,
            "10.0.0.1",
            EventType::ApiCall,
            Some("shared"),
            StatusCode::Success,
        ));

        let mut main = store.main_state();
        assert_eq!(main.user(1).unwrap().resources.count("shared"), 1);
        assert_eq!(main.user(2).unwrap().resources.count("shared"), 1);

        store.expire_old_logs(&mut main, 5000);
        assert!(main.user(1).unwrap().is_idle());
        assert!(main.user(2).unwrap().is_idle());
    }

    // -- 6. multiset invariant ----------------------------------------------

    #[test]
    fn ref_totals_match_in_window_entries() {
        let store = store_with_window(300);
        let resources = [Some("a"), Some("a"), Some("b"), None, Some("c")];
        for (i, resource) in resources.iter().enumerate() {
            store.push_log(entry(
                1000 + i as i64,
                9,
                &format!("10.0.0.{}", i % 2),
                EventType::FileAccess,
                *resource,
                StatusCode::Success,
            ));
        }

        let main = store.main_state();
        let user = main.user(9).unwrap();
        let with_resource = resources.iter().flatten().count() as u64;
        assert_eq!(user.resources.total_refs(), with_resource);
        assert_eq!(user.ip_refs.total_refs(), resources.len() as u64);
        assert_eq!(user.resources.distinct(), 3);
        assert_eq!(user.ip_refs.distinct(), 2);
    }
}
