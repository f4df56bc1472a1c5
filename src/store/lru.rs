//! LRU Tracker Module
//!
//! Access-order bookkeeping for the in-memory store's capacity eviction.

use std::collections::VecDeque;

// == LRU Tracker ==
/// Tracks access order of slot keys.
///
/// Front = most recently used, back = least recently used.
#[derive(Debug)]
pub struct LruTracker<K> {
    order: VecDeque<K>,
}

impl<K: PartialEq + Clone> LruTracker<K> {
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as most recently used.
    pub fn touch(&mut self, key: &K) {
        self.remove(key);
        self.order.push_front(key.clone());
    }

    // == Remove ==
    pub fn remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    /// Drops every key matching the predicate.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&K) -> bool) {
        self.order.retain(|k| !predicate(k));
    }

    // == Evict Oldest ==
    /// Pops the least recently used key.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_back()
    }

    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.back()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

impl<K: PartialEq + Clone> Default for LruTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}
