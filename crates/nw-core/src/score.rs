//! Scoring policy: additive risk scores and fixed severity steps.

use std::fmt;

use crate::store::{IpStats, UserStats};

/// Rolling window length in seconds; also the config default.
pub const WINDOW_SECONDS: u64 = 300;

/// Failed-login count at which an entity (user or source IP) is considered
/// for alerting.
pub const THRESH_FAILED_LOGINS: u32 = 5;
/// Distinct-resource count at which a user is considered for alerting.
pub const THRESH_DISTINCT_RESOURCES: usize = 10;
/// Distinct-source-IP count at which a user is considered for alerting.
pub const THRESH_DISTINCT_IPS: usize = 3;

// Additive weights. Chosen so that crossing any single threshold above
// already lands in the Suspicious band (score >= 11): 5 failed logins
// score 15, 10 resources score 20, 3 IPs score 12.
const WEIGHT_FAILED: u32 = 3;
const WEIGHT_RESOURCE: u32 = 2;
const WEIGHT_IP: u32 = 4;

/// Risk score for a user rollup. Monotonically non-decreasing in every
/// counter.
pub fn compute_user_score(user: &UserStats) -> u32 {
    WEIGHT_FAILED * user.failed_attempts
        + WEIGHT_RESOURCE * user.resources.distinct() as u32
        + WEIGHT_IP * user.ip_refs.distinct() as u32
}

/// Risk score for a source-IP rollup.
pub fn compute_ip_score(stats: &IpStats) -> u32 {
    WEIGHT_FAILED * stats.failed_attempts
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Ordinal risk classification derived from a score via fixed steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Normal,
    Suspicious,
    High,
    Critical,
}

impl Severity {
    pub fn from_score(score: u32) -> Self {
        match score {
            31.. => Self::Critical,
            21..=30 => Self::High,
            11..=20 => Self::Suspicious,
            _ => Self::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL THREAT",
            Self::High => "HIGH RISK",
            Self::Suspicious => "SUSPICIOUS",
            Self::Normal => "NORMAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
