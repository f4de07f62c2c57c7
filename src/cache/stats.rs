//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, computations and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Requests answered without invoking the caller's compute function
    pub hits: u64,
    /// Requests not answered from the cache (no entry, or its value was reclaimed)
    pub misses: u64,
    /// Misses on a key whose entry existed but no longer resolved
    pub reclaimed: u64,
    /// Successful compute invocations
    pub computations: u64,
    /// Failed compute invocations (never cached)
    pub failures: u64,
    /// Hits served by waiting on another caller's successful computation
    pub coalesced: u64,
    /// Values dropped from the retention ring to stay within capacity
    pub evictions: u64,
    /// Current number of entries in the cache, live or not
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records a miss; `reclaimed` marks a key whose previous value was dropped.
    pub fn record_miss(&mut self, reclaimed: bool) {
        self.misses += 1;
        if reclaimed {
            self.reclaimed += 1;
        }
    }

    pub fn record_computation(&mut self) {
        self.computations += 1;
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    // == Record Coalesced ==
    /// A waiter received the value of another caller's computation; counts as
    /// a hit as well.
    pub fn record_coalesced(&mut self) {
        self.hits += 1;
        self.coalesced += 1;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
