//! Memoization of composed heuristic values.
//!
//! Keys are [`StateFingerprint`]s. The cache never evicts single entries:
//! once it holds `capacity` entries the next insert clears it first.

use std::collections::HashMap;

use antplan_core::StateFingerprint;
use tracing::debug;

use crate::composer::HeuristicValue;

/// Fingerprint-keyed store of composed values.
#[derive(Debug, Clone)]
pub struct HeuristicCache {
    entries: HashMap<StateFingerprint, HeuristicValue>,
    capacity: usize,
    enabled: bool,
    clears: u64,
}

impl HeuristicCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            enabled: true,
            clears: 0,
        }
    }

    /// A cache that stores nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0)
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.capacity > 0
    }

    pub fn get(&self, key: StateFingerprint) -> Option<HeuristicValue> {
        if !self.is_enabled() {
            return None;
        }
        self.entries.get(&key).copied()
    }

    /// Stores `value`; returns true if the cache was cleared to make room.
    pub fn insert(&mut self, key: StateFingerprint, value: HeuristicValue) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let mut cleared = false;
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            debug!(event = "cache_clear", entries = self.entries.len(), capacity = self.capacity);
            self.entries.clear();
            self.clears += 1;
            cleared = true;
        }
        self.entries.insert(key, value);
        cleared
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of capacity-triggered clears so far.
    #[inline]
    pub fn clears(&self) -> u64 {
        self.clears
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
