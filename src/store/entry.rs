//! Stored Entry Module
//!
//! One encoded value held by the in-memory store, with its expiry deadline.

use std::time::Duration;

use tokio::time::Instant;

use crate::policy::Ttl;

// == Stored Entry ==
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// Encoded bytes as produced by the codec
    pub value: Vec<u8>,
    /// Write time
    pub created_at: Instant,
    /// Deadline, None = no expiry
    pub expires_at: Option<Instant>,
}

impl StoredEntry {
    // == Constructor ==
    pub fn new(value: Vec<u8>, ttl: Ttl) -> Self {
        let now = Instant::now();
        let expires_at = ttl.as_duration().and_then(|d| now.checked_add(d));

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }

    // == Time To Live ==
    /// Remaining lifetime; zero once expired, None for persistent entries.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
