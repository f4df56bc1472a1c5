//! Entry expiry settings.

use std::fmt;
use std::time::Duration;

// == Ttl ==
/// How long the backing store keeps an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ttl {
    /// Entry expires after the given duration
    After(Duration),
    /// Entry persists until explicitly evicted
    NoExpiry,
}

impl Ttl {
    pub fn secs(secs: u64) -> Self {
        Ttl::After(Duration::from_secs(secs))
    }

    pub fn mins(mins: u64) -> Self {
        Ttl::After(Duration::from_secs(mins.saturating_mul(60)))
    }

    pub fn days(days: u64) -> Self {
        Ttl::After(Duration::from_secs(days.saturating_mul(24 * 60 * 60)))
    }

    /// Returns the expiry duration, or None for entries that never expire.
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Ttl::After(d) => Some(*d),
            Ttl::NoExpiry => None,
        }
    }

    /// Whole milliseconds, rounded up so sub-millisecond TTLs never become zero.
    pub fn as_millis_ceil(&self) -> Option<u64> {
        self.as_duration().map(|d| {
            let ms = d.as_millis();
            let ms = if d.subsec_nanos() % 1_000_000 != 0 { ms + 1 } else { ms };
            u64::try_from(ms).unwrap_or(u64::MAX)
        })
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::After(d) => write!(f, "{:?}", d),
            Ttl::NoExpiry => f.write_str("no-expiry"),
        }
    }
}
