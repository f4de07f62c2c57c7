//! Cache Entry Module
//!
//! Defines the bookkeeping kept per key: the weak handle plus metadata.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::cache::WeakHandle;

// == Cache Entry ==
/// Represents the cached state of a single key.
///
/// An entry outlives its value: once the value is reclaimed the handle stops
/// resolving but the entry stays until it is purged or overwritten.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// Weak reference to the last computed value
    handle: WeakHandle<V>,
    /// When the current value was computed
    computed_at: Instant,
    /// Number of successful computations for this key
    computations: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry for a freshly computed value.
    ///
    /// # Arguments
    /// * `value` - The value just returned by the compute function
    /// * `max_age` - Optional max age after which the handle stops resolving
    pub fn new(value: &Arc<V>, max_age: Option<Duration>) -> Self {
        Self {
            handle: WeakHandle::new(value, max_age),
            computed_at: Instant::now(),
            computations: 1,
        }
    }

    // == Replace ==
    /// Points the entry at a recomputed value, keeping the computation count.
    pub fn replace(&mut self, value: &Arc<V>, max_age: Option<Duration>) {
        self.handle = WeakHandle::new(value, max_age);
        self.computed_at = Instant::now();
        self.computations += 1;
    }

    /// Resolves the handle, see [`WeakHandle::resolve`].
    pub fn resolve(&self) -> Option<Arc<V>> {
        self.handle.resolve()
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_live()
    }

    pub fn handle(&self) -> &WeakHandle<V> {
        &self.handle
    }

    /// Time since the current value was computed.
    pub fn age(&self) -> Duration {
        self.computed_at.elapsed()
    }

    pub fn computations(&self) -> u64 {
        self.computations
    }
}
