mod rollup;
mod window;

pub use rollup::{IpStats, RefSet, UserStats};

use std::collections::{HashMap, VecDeque};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use nw_config::AnalyzerConfig;

use crate::alert::{AlertItem, AlertQueue, PushOutcome};
use crate::event::LogEntry;

// ---------------------------------------------------------------------------
// Store — process-wide shared state
// ---------------------------------------------------------------------------

/// Shared state for the whole pipeline: the rolling log window, the user
/// and IP rollup indexes, the bounded alert queue, and the coordination
/// primitives the worker threads rendezvous on.
///
/// Two mutexes guard the state: `main` covers the log window, the user
/// index, the alert queue, counters, and control flags; `ip_index` covers
/// the per-IP rollups. Lock order is **main → IP** and must never be
/// reversed. Both condition variables pair with the main mutex.
pub struct Store {
    window: Duration,
    main: Mutex<MainState>,
    ip_index: Mutex<IpIndex>,
    new_log: Condvar,
    new_alert: Condvar,
}

/// Everything guarded by the main mutex.
pub struct MainState {
    /// Window of live entries, newest at the front, oldest at the back.
    log: VecDeque<LogEntry>,
    users: HashMap<u32, UserStats>,
    alerts: AlertQueue,
    ingestion_done: bool,
    analyzer_done: bool,
    total_logs: u64,
    total_alerts: u64,
}

/// The per-IP rollup index, behind its own mutex nested inside the main one.
#[derive(Default)]
pub struct IpIndex {
    map: HashMap<String, IpStats>,
}

/// Coarse pipeline progress for the supervising thread.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub ingestion_done: bool,
    pub analyzer_done: bool,
    pub live_entries: usize,
    pub total_logs: u64,
}

impl Store {
    pub fn new(config: &AnalyzerConfig) -> Self {
        Self {
            window: config.window.as_duration(),
            main: Mutex::new(MainState {
                log: VecDeque::new(),
                users: HashMap::new(),
                alerts: AlertQueue::default(),
                ingestion_done: false,
                analyzer_done: false,
                total_logs: 0,
                total_alerts: 0,
            }),
            ip_index: Mutex::new(IpIndex::default()),
            new_log: Condvar::new(),
            new_alert: Condvar::new(),
        }
    }

    /// Expiry horizon in seconds.
    pub fn window_secs(&self) -> i64 {
        self.window.as_secs() as i64
    }

    /// Acquire the main mutex.
    pub fn main_state(&self) -> MutexGuard<'_, MainState> {
        self.main.lock().expect("main lock poisoned")
    }

    /// Acquire the IP index mutex.
    ///
    /// Callers must already hold the main guard (lock order main → IP);
    /// taking this lock first and then calling into anything that touches
    /// the main mutex would deadlock against the sweep.
    pub fn ip_index(&self) -> MutexGuard<'_, IpIndex> {
        self.ip_index.lock().expect("ip index lock poisoned")
    }

    /// Block on the `new_log` condition. Spurious wakeups are possible;
    /// callers loop on their predicate.
    pub fn wait_new_log<'a>(&self, guard: MutexGuard<'a, MainState>) -> MutexGuard<'a, MainState> {
        self.new_log.wait(guard).expect("main lock poisoned")
    }

    /// Block on the `new_alert` condition. Spurious wakeups are possible;
    /// callers loop on their predicate.
    pub fn wait_new_alert<'a>(
        &self,
        guard: MutexGuard<'a, MainState>,
    ) -> MutexGuard<'a, MainState> {
        self.new_alert.wait(guard).expect("main lock poisoned")
    }

    /// Insert a freshly parsed entry at the head of the log window, fold it
    /// into the rollups, and wake the analyzer.
    pub fn push_log(&self, entry: LogEntry) {
        let mut main = self.main_state();
        self.add_log_to_stats(&mut main, &entry);
        main.log.push_front(entry);
        main.total_logs += 1;
        self.new_log.notify_one();
    }

    /// Enqueue an alert, waking the sink. A full queue drops the new item
    /// rather than blocking the analyzer.
    pub fn push_alert(&self, main: &mut MainState, item: AlertItem) -> PushOutcome {
        match main.alerts.push(item) {
            PushOutcome::Accepted => {
                self.new_alert.notify_one();
                PushOutcome::Accepted
            }
            PushOutcome::Dropped => {
                tracing::warn!(
                    dropped_so_far = main.alerts.dropped(),
                    "alert queue full, dropping alert"
                );
                PushOutcome::Dropped
            }
        }
    }

    /// Mark the input feed exhausted and wake every `new_log` waiter so the
    /// analyzer can begin its drain.
    pub fn signal_ingestion_done(&self) {
        let mut main = self.main_state();
        main.ingestion_done = true;
        self.new_log.notify_all();
    }

    /// Mark the analyzer finished and wake every `new_alert` waiter so the
    /// sink can drain and exit.
    pub fn signal_analyzer_done(&self, main: &mut MainState) {
        main.analyzer_done = true;
        self.new_alert.notify_all();
    }

    /// Snapshot coarse progress for the supervising thread.
    pub fn progress(&self) -> Progress {
        let main = self.main_state();
        Progress {
            ingestion_done: main.ingestion_done,
            analyzer_done: main.analyzer_done,
            live_entries: main.log.len(),
            total_logs: main.total_logs,
        }
    }
}

// ---------------------------------------------------------------------------
// MainState accessors
// ---------------------------------------------------------------------------

impl MainState {
    pub fn is_log_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn ingestion_done(&self) -> bool {
        self.ingestion_done
    }

    pub fn analyzer_done(&self) -> bool {
        self.analyzer_done
    }

    pub fn has_alerts(&self) -> bool {
        !self.alerts.is_empty()
    }

    /// Remove and return every queued alert, oldest first.
    pub fn drain_alerts(&mut self) -> Vec<AlertItem> {
        self.alerts.drain()
    }

    pub fn total_logs(&self) -> u64 {
        self.total_logs
    }

    pub fn total_alerts(&self) -> u64 {
        self.total_alerts
    }

    pub fn alerts_dropped(&self) -> u64 {
        self.alerts.dropped()
    }

    /// Lookup-only user access (used by tests and the dashboard; removal
    /// checks must never resurrect an entity through get-or-create).
    pub fn user(&self, user_id: u32) -> Option<&UserStats> {
        self.users.get(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &UserStats> {
        self.users.values()
    }

    pub(crate) fn users_mut(&mut self) -> impl Iterator<Item = &mut UserStats> {
        self.users.values_mut()
    }

    pub(crate) fn get_or_create_user(&mut self, user_id: u32) -> &mut UserStats {
        self.users
            .entry(user_id)
            .or_insert_with(|| UserStats::new(user_id))
    }

    pub(crate) fn user_mut(&mut self, user_id: u32) -> Option<&mut UserStats> {
        self.users.get_mut(&user_id)
    }

    /// Drop every user whose counters have all returned to zero. Returns
    /// how many were removed.
    pub(crate) fn remove_idle_users(&mut self) -> usize {
        let before = self.users.len();
        self.users.retain(|_, user| !user.is_idle());
        before - self.users.len()
    }

    pub(crate) fn count_alerts(&mut self, emitted: u64) {
        self.total_alerts += emitted;
    }

    pub(crate) fn oldest(&self) -> Option<&LogEntry> {
        self.log.back()
    }

    pub(crate) fn pop_oldest(&mut self) -> Option<LogEntry> {
        self.log.pop_back()
    }
}

// ---------------------------------------------------------------------------
// IpIndex accessors
// ---------------------------------------------------------------------------

impl IpIndex {
    /// Lookup-only access.
    pub fn get(&self, ip: &str) -> Option<&IpStats> {
        self.map.get(ip)
    }

    pub fn values(&self) -> impl Iterator<Item = &IpStats> {
        self.map.values()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut IpStats> {
        self.map.values_mut()
    }

    pub(crate) fn get_or_create(&mut self, ip: &str) -> &mut IpStats {
        self.map
            .entry(ip.to_string())
            .or_insert_with(|| IpStats::new(ip))
    }

    pub(crate) fn get_mut(&mut self, ip: &str) -> Option<&mut IpStats> {
        self.map.get_mut(ip)
    }

    /// Drop every IP whose failure counter has returned to zero. Returns
    /// how many were removed.
    pub(crate) fn remove_idle(&mut self) -> usize {
        let before = self.map.len();
        self.map.retain(|_, stats| stats.failed_attempts > 0);
        before - self.map.len()
    }
}
