//! Tree operation statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by a tree.
///
/// Counters are atomic so that read-only operations such as `search` can
/// record themselves through `&self`.
///
/// # Memory Ordering
/// All operations use `Ordering::Relaxed`: the counters are independent and
/// only need to be individually exact.
///
/// # Example
/// ```
/// use medindex::TreeStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = TreeStats::new();
/// stats.splits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().splits, 1);
/// ```
#[derive(Debug, Default)]
pub struct TreeStats {
    /// Calls to `search`/`search_mut`/`contains_key`.
    pub searches: AtomicU64,

    /// Calls to `insert`, including rejected ones.
    pub inserts: AtomicU64,

    /// Calls to `delete`, including ones that found nothing.
    pub deletes: AtomicU64,

    /// Node splits, root splits included.
    pub splits: AtomicU64,

    /// Keys rotated in from a sibling during delete.
    pub borrows: AtomicU64,

    /// Sibling merges during delete.
    pub merges: AtomicU64,

    /// Times the tree grew by one level.
    pub root_splits: AtomicU64,

    /// Times the tree shrank by one level.
    pub root_collapses: AtomicU64,
}

impl TreeStats {
    /// Create a stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            searches: self.searches.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            splits: self.splits.load(Ordering::Relaxed),
            borrows: self.borrows.load(Ordering::Relaxed),
            merges: self.merges.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
            root_collapses: self.root_collapses.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.searches,
            &self.inserts,
            &self.deletes,
            &self.splits,
            &self.borrows,
            &self.merges,
            &self.root_splits,
            &self.root_collapses,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time copy of [`TreeStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub searches: u64,
    pub inserts: u64,
    pub deletes: u64,
    pub splits: u64,
    pub borrows: u64,
    pub merges: u64,
    pub root_splits: u64,
    pub root_collapses: u64,
}

impl StatsSnapshot {
    /// Net change in height since the counters were last reset.
    pub fn height_delta(&self) -> i64 {
        self.root_splits as i64 - self.root_collapses as i64
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ inserts: {}, deletes: {}, searches: {}, splits: {}, borrows: {}, merges: {}, height: {:+} }}",
            self.inserts,
            self.deletes,
            self.searches,
            self.splits,
            self.borrows,
            self.merges,
            self.height_delta()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = TreeStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_stats_bump_and_reset() {
        let stats = TreeStats::new();
        TreeStats::bump(&stats.merges);
        TreeStats::bump(&stats.merges);
        TreeStats::bump(&stats.root_splits);
        assert_eq!(stats.snapshot().merges, 2);

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_height_delta() {
        let snapshot = StatsSnapshot {
            root_splits: 3,
            root_collapses: 1,
            ..Default::default()
        };
        assert_eq!(snapshot.height_delta(), 2);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = StatsSnapshot {
            inserts: 8,
            deletes: 1,
            splits: 3,
            root_splits: 1,
            ..Default::default()
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("inserts: 8"));
        assert!(display.contains("splits: 3"));
        assert!(display.contains("height: +1"));
    }
}
