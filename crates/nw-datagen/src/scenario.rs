//! Scenario feed generation.
//!
//! A full scenario interleaves five traffic patterns on one timeline:
//! background noise from twenty well-behaved users, a brute-force attacker
//! (one user, one IP, failed logins only), a resource crawler (one user
//! walking many distinct documents), an IP hopper (one user failing logins
//! from many addresses), and a combined attacker mixing all three signals.
//!
//! Background users each keep to a single source IP and a private handful
//! of resources, so with the default proportions only the four attackers
//! cross an alerting threshold.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Per-pattern event counts plus the RNG seed.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub normal_events: usize,
    pub brute_force_events: usize,
    pub crawler_events: usize,
    pub hopper_events: usize,
    pub combined_events: usize,
    pub filler_events: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            normal_events: 600,
            brute_force_events: 80,
            crawler_events: 80,
            hopper_events: 60,
            combined_events: 100,
            filler_events: 280,
        }
    }
}

impl ScenarioConfig {
    /// Background traffic only; no pattern crosses a threshold.
    pub fn quiet(seed: u64, normal_events: usize) -> Self {
        Self {
            seed,
            normal_events,
            brute_force_events: 0,
            crawler_events: 0,
            hopper_events: 0,
            combined_events: 0,
            filler_events: 0,
        }
    }
}

/// A generated feed, ready to write.
#[derive(Debug)]
pub struct Scenario {
    /// Feed lines including the leading comment header.
    pub lines: Vec<String>,
    /// Event entries (the header comment excluded).
    pub entries: usize,
    /// Seconds between the first and last entry.
    pub span_secs: i64,
}

const BRUTE_FORCE_USER: u32 = 101;
const CRAWLER_USER: u32 = 102;
const HOPPER_USER: u32 = 103;
const COMBINED_USER: u32 = 104;

const NORMAL_IPS: [&str; 10] = [
    "10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5", "10.0.0.6", "10.0.0.7",
    "10.0.0.8", "10.0.0.9", "10.0.0.10",
];

const NORMAL_EVENTS: [&str; 4] = ["LOGIN", "FILE_ACCESS", "API_CALL", "TRANSACTION"];

/// Generate a scenario whose final entry lands on `anchor` (an epoch
/// second); earlier entries stretch backwards from there. Identical seeds
/// produce identical feeds.
pub fn generate(config: &ScenarioConfig, anchor: i64) -> Scenario {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut rows: Vec<(i64, String)> = Vec::new();
    let mut t: i64 = 0;

    // Background traffic: one IP per user, a private pool of eight
    // resources, one failure in twenty.
    for _ in 0..config.normal_events {
        let user = rng.random_range(1..=20u32);
        let ip = NORMAL_IPS[user as usize % 10];
        let event = NORMAL_EVENTS[rng.random_range(0..NORMAL_EVENTS.len())];
        let resource = format!("res_{}_{}", user, rng.random_range(1..=8u32));
        let status = if rng.random_range(0..20) == 0 {
            "FAILED"
        } else {
            "SUCCESS"
        };
        rows.push((t, format!("{user}, {ip}, {event}, {resource}, {status}")));
        t += rng.random_range(1..=3);
    }

    // Brute-force attacker: one user, one IP, failed logins only.
    for _ in 0..config.brute_force_events {
        rows.push((
            t,
            format!("{BRUTE_FORCE_USER}, 192.168.1.20, LOGIN, -, FAILED"),
        ));
        t += 2;
    }

    // Resource crawler: distinct documents, all successful.
    for i in 0..config.crawler_events {
        rows.push((
            t,
            format!(
                "{CRAWLER_USER}, 172.16.0.55, FILE_ACCESS, secret_doc_{}, SUCCESS",
                i + 1
            ),
        ));
        t += 2;
    }

    // IP hopper: one failed login from each of many addresses.
    for i in 0..config.hopper_events {
        let ip = format!("45.33.{}.{}", i / 10 + 1, i % 254 + 1);
        rows.push((t, format!("{HOPPER_USER}, {ip}, LOGIN, -, FAILED")));
        t += 3;
    }

    // Combined attacker: many IPs, many resources, half failed.
    for i in 0..config.combined_events {
        let ip = format!("99.{}.{}.{}", i % 5 + 1, i % 10 + 1, i % 254 + 1);
        let event = if i % 3 == 0 { "LOGIN" } else { "FILE_ACCESS" };
        let status = if i % 2 == 0 { "FAILED" } else { "SUCCESS" };
        rows.push((
            t,
            format!("{COMBINED_USER}, {ip}, {event}, vault_{}, {status}", i + 1),
        ));
        t += 2;
    }

    // Trailing background traffic.
    for _ in 0..config.filler_events {
        let user = rng.random_range(1..=20u32);
        let ip = NORMAL_IPS[user as usize % 10];
        let resource = format!("res_{}_{}", user, rng.random_range(1..=5u32));
        rows.push((t, format!("{user}, {ip}, API_CALL, {resource}, SUCCESS")));
        t += rng.random_range(1..=4);
    }

    // Shift the relative timeline so the last entry sits on the anchor.
    let last = rows.last().map_or(0, |(at, _)| *at);
    let span_secs = last - rows.first().map_or(0, |(at, _)| *at);
    let shift = anchor - last;

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "# NightWatch sample feed (seed {}, {} entries)",
        config.seed,
        rows.len()
    ));
    for (at, tail) in &rows {
        lines.push(format!("{}, {tail}", at + shift));
    }

    Scenario {
        entries: rows.len(),
        span_secs,
        lines,
    }
}

/// Generate and write a scenario feed to `path`.
pub fn write_to(path: impl AsRef<Path>, config: &ScenarioConfig, anchor: i64) -> anyhow::Result<Scenario> {
    let scenario = generate(config, anchor);
    let mut file = std::fs::File::create(path.as_ref())
        .with_context(|| format!("create {}", path.as_ref().display()))?;
    for line in &scenario.lines {
        writeln!(file, "{line}")?;
    }
    Ok(scenario)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use nw_core::event::{parse_line, LogEntry};

    use super::*;

    fn parsed(config: &ScenarioConfig, anchor: i64) -> Vec<LogEntry> {
        generate(config, anchor)
            .lines
            .iter()
            .filter(|l| !l.starts_with('#'))
            .map(|l| parse_line(l).expect("generated line must parse"))
            .collect()
    }

    #[test]
    fn same_seed_same_feed() {
        let config = ScenarioConfig::default();
        assert_eq!(generate(&config, 5000).lines, generate(&config, 5000).lines);

        let mut other = ScenarioConfig::default();
        other.seed = 7;
        assert_ne!(generate(&other, 5000).lines, generate(&config, 5000).lines);
    }

    #[test]
    fn entry_count_matches_config() {
        let config = ScenarioConfig::default();
        let scenario = generate(&config, 10_000_000);
        let expected = config.normal_events
            + config.brute_force_events
            + config.crawler_events
            + config.hopper_events
            + config.combined_events
            + config.filler_events;
        assert_eq!(scenario.entries, expected);
        assert_eq!(scenario.lines.len(), expected + 1); // + header comment
    }

    #[test]
    fn every_line_parses_and_ends_on_the_anchor() {
        let anchor = 1_708_069_200;
        let entries = parsed(&ScenarioConfig::default(), anchor);
        assert_eq!(entries.last().unwrap().timestamp, anchor);
        // Timeline is non-decreasing.
        assert!(entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn attack_patterns_are_present() {
        let entries = parsed(&ScenarioConfig::default(), 5_000_000);

        let brute: Vec<_> = entries.iter().filter(|e| e.user_id == 101).collect();
        assert_eq!(brute.len(), 80);
        assert!(brute.iter().all(|e| e.is_failed_login()));
        assert!(brute.iter().all(|e| e.ip_address == "192.168.1.20"));

        let crawler_docs: HashSet<_> = entries
            .iter()
            .filter(|e| e.user_id == 102)
            .filter_map(|e| e.resource_id.clone())
            .collect();
        assert_eq!(crawler_docs.len(), 80);

        let hopper_ips: HashSet<_> = entries
            .iter()
            .filter(|e| e.user_id == 103)
            .map(|e| e.ip_address.clone())
            .collect();
        assert_eq!(hopper_ips.len(), 60);
        assert!(entries
            .iter()
            .filter(|e| e.user_id == 103)
            .all(|e| e.is_failed_login()));

        let combined_fails = entries
            .iter()
            .filter(|e| e.user_id == 104 && e.is_failed_login())
            .count();
        assert!(combined_fails > 0);
    }

    #[test]
    fn quiet_scenario_stays_under_every_threshold() {
        let entries = parsed(&ScenarioConfig::quiet(42, 600), 5_000_000);
        assert_eq!(entries.len(), 600);

        let mut failed: HashMap<u32, usize> = HashMap::new();
        let mut resources: HashMap<u32, HashSet<String>> = HashMap::new();
        let mut ips: HashMap<u32, HashSet<String>> = HashMap::new();
        for entry in &entries {
            if entry.is_failed_login() {
                *failed.entry(entry.user_id).or_default() += 1;
            }
            if let Some(res) = &entry.resource_id {
                resources.entry(entry.user_id).or_default().insert(res.clone());
            }
            ips.entry(entry.user_id).or_default().insert(entry.ip_address.clone());
        }

        assert!(failed.values().all(|&n| n < 5), "failed: {failed:?}");
        assert!(resources.values().all(|set| set.len() < 10));
        assert!(ips.values().all(|set| set.len() < 3));
    }
}
