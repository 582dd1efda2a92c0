//! Elapsed-time budget shared between a client and its in-flight polls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Shared, mutable ceiling on how long a poll may run.
///
/// Clones share one ceiling. The value is re-read on every capacity check
/// rather than captured at poll start, so `set_ceiling` takes effect
/// immediately for polls already in flight. Mutation is best-effort and
/// unsynchronized with respect to checks racing it.
#[derive(Debug, Clone)]
pub struct BudgetSource {
    ceiling_ms: Arc<AtomicU64>,
}

impl BudgetSource {
    /// Creates a budget with the given ceiling.
    pub fn new(ceiling: Duration) -> Self {
        Self {
            ceiling_ms: Arc::new(AtomicU64::new(as_millis_u64(ceiling))),
        }
    }

    /// Replaces the ceiling for every clone of this budget.
    pub fn set_ceiling(&self, ceiling: Duration) {
        self.ceiling_ms
            .store(as_millis_u64(ceiling), Ordering::SeqCst);
    }

    /// The current ceiling.
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.ceiling_ms.load(Ordering::SeqCst))
    }

    /// True while the poll that started at `started_at` still has time left
    /// at `now`. Exhaustion is inclusive: once the elapsed time reaches the
    /// ceiling, capacity is gone.
    pub fn has_capacity(&self, started_at: Instant, now: Instant) -> bool {
        now.duration_since(started_at) < self.ceiling()
    }
}

fn as_millis_u64(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_exhausted_exactly_at_the_ceiling() {
        let budget = BudgetSource::new(Duration::from_secs(5));
        let start = Instant::now();

        assert!(budget.has_capacity(start, start));
        assert!(budget.has_capacity(start, start + Duration::from_millis(4_999)));
        assert!(!budget.has_capacity(start, start + Duration::from_secs(5)));
        assert!(!budget.has_capacity(start, start + Duration::from_secs(6)));
    }

    #[test]
    fn ceiling_changes_apply_between_checks() {
        let budget = BudgetSource::new(Duration::from_secs(5));
        let start = Instant::now();
        let probe = start + Duration::from_secs(5);

        assert!(!budget.has_capacity(start, probe));
        budget.set_ceiling(Duration::from_secs(10));
        assert!(budget.has_capacity(start, probe));
    }

    #[test]
    fn clones_share_one_ceiling() {
        let budget = BudgetSource::new(Duration::from_secs(5));
        let handle = budget.clone();
        handle.set_ceiling(Duration::from_secs(1));
        assert_eq!(budget.ceiling(), Duration::from_secs(1));
    }
}
