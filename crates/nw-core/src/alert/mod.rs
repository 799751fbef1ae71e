mod sink;

pub use sink::{AlertSink, CriticalFileSink};

use std::collections::VecDeque;

use crate::score::Severity;

/// Queue capacity. Pushes beyond this are dropped with a warning; the
/// producer never blocks.
pub const ALERT_QUEUE_CAP: usize = 1024;

/// One alert emitted by the analyzer and consumed by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertItem {
    /// `None` for an IP-level alert.
    pub user: Option<u32>,
    /// For a user alert, a representative source IP (the first stored in
    /// the user's IP multiset, or `0.0.0.0` when it is empty).
    pub ip_address: String,
    pub score: u32,
    pub severity: Severity,
    /// Sweep time the alert was emitted at, seconds since the epoch.
    pub timestamp: i64,
}

/// Whether an alert made it into the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Accepted,
    Dropped,
}

/// Bounded FIFO queue of pending alerts.
#[derive(Debug, Default)]
pub struct AlertQueue {
    items: VecDeque<AlertItem>,
    dropped: u64,
}

impl AlertQueue {
    pub fn push(&mut self, item: AlertItem) -> PushOutcome {
        if self.items.len() >= ALERT_QUEUE_CAP {
            self.dropped += 1;
            return PushOutcome::Dropped;
        }
        self.items.push_back(item);
        PushOutcome::Accepted
    }

    /// Remove and return every queued item, oldest first.
    pub fn drain(&mut self) -> Vec<AlertItem> {
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// How many alerts have been dropped on overflow since startup.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn item(score: u32) -> AlertItem {
        AlertItem {
            user: Some(1),
            ip_address: "10.0.0.1".to_string(),
            score,
            severity: Severity::from_score(score),
            timestamp: 0,
        }
    }

    #[test]
    fn drains_in_fifo_order() {
        let mut queue = AlertQueue::default();
        for score in [11, 21, 31] {
            assert_eq!(queue.push(item(score)), PushOutcome::Accepted);
        }
        let scores: Vec<u32> = queue.drain().iter().map(|a| a.score).collect();
        assert_eq!(scores, vec![11, 21, 31]);
        assert!(queue.is_empty());
    }

    #[test]
    fn overflow_drops_new_items_and_counts_them() {
        let mut queue = AlertQueue::default();
        for i in 0..ALERT_QUEUE_CAP {
            assert_eq!(queue.push(item(i as u32)), PushOutcome::Accepted);
        }
        assert_eq!(queue.push(item(9999)), PushOutcome::Dropped);
        assert_eq!(queue.push(item(9999)), PushOutcome::Dropped);

        assert_eq!(queue.len(), ALERT_QUEUE_CAP);
        assert_eq!(queue.dropped(), 2);

        // The queued prefix is intact: oldest item still first.
        let batch = queue.drain();
        assert_eq!(batch.len(), ALERT_QUEUE_CAP);
        assert_eq!(batch[0].score, 0);

        // Draining frees capacity again.
        assert_eq!(queue.push(item(1)), PushOutcome::Accepted);
    }
}
