//! Outcomes of facade operations.

// == Cached ==
/// Result of a cache read.
#[derive(Debug, Clone, PartialEq)]
pub enum Cached<T> {
    /// Entry found and decoded
    Hit(T),
    /// Entry records that the value does not exist
    Null,
    /// Nothing usable in the cache
    Miss,
}

impl<T> Cached<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Cached::Hit(_))
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Cached::Miss)
    }

    /// Drops the distinction between a cached absence and a miss.
    pub fn into_option(self) -> Option<T> {
        match self {
            Cached::Hit(value) => Some(value),
            Cached::Null | Cached::Miss => None,
        }
    }
}

// == Write Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Entry written with the namespace TTL
    Stored,
    /// Absent value not written because the namespace does not cache nulls
    SkippedNull,
    /// Write failed and was logged
    Degraded,
}

// == Evict Outcome ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictOutcome {
    Evicted,
    /// Delete failed and was logged
    Degraded,
}
