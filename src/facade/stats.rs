//! Facade Statistics Module
//!
//! Lock-free counters describing how cache operations turned out.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Facade Stats ==
/// Shared counters updated by every facade operation.
#[derive(Debug, Default)]
pub struct FacadeStats {
    hits: AtomicU64,
    null_hits: AtomicU64,
    misses: AtomicU64,
    corrupt: AtomicU64,
    writes: AtomicU64,
    skipped_nulls: AtomicU64,
    evictions: AtomicU64,
    degraded: AtomicU64,
}

impl FacadeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_null_hit(&self) {
        self.null_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_corrupt(&self) {
        self.corrupt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped_null(&self) {
        self.skipped_nulls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            null_hits: self.null_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            corrupt: self.corrupt.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            skipped_nulls: self.skipped_nulls.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}

// == Stats Snapshot ==
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that returned a cached absence
    pub null_hits: u64,
    /// Reads that fell through to the caller, degraded ones included
    pub misses: u64,
    /// Entries that failed to decode
    pub corrupt: u64,
    /// Successful writes
    pub writes: u64,
    /// Null writes suppressed by policy
    pub skipped_nulls: u64,
    /// Successful single-key or namespace evictions
    pub evictions: u64,
    /// Operations swallowed after a store or codec failure
    pub degraded: u64,
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Share of reads answered from the cache, null hits included.
    ///
    /// Returns 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let answered = self.hits + self.null_hits;
        let total = answered + self.misses;
        if total == 0 {
            0.0
        } else {
            answered as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let snapshot = FacadeStats::new().snapshot();
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let stats = FacadeStats::new();
        stats.record_hit();
        stats.record_null_hit();
        stats.record_miss();
        stats.record_miss();
        assert_eq!(stats.snapshot().hit_rate(), 0.5);
    }

    #[test]
    fn test_counters_are_independent() {
        let stats = FacadeStats::new();
        stats.record_write();
        stats.record_write();
        stats.record_skipped_null();
        stats.record_eviction();
        stats.record_corrupt();
        stats.record_degraded();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.writes, 2);
        assert_eq!(snapshot.skipped_nulls, 1);
        assert_eq!(snapshot.evictions, 1);
        assert_eq!(snapshot.corrupt, 1);
        assert_eq!(snapshot.degraded, 1);
        assert_eq!(snapshot.hits, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = FacadeStats::new();
        stats.record_hit();
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["hits"], 1);
        assert_eq!(json["misses"], 0);
    }
}
