//! Cache Store Module
//!
//! Main cache engine: a HashMap of weak handles, an optional retention ring
//! and the compute-or-fetch decision.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, RetentionRing};
use crate::config::Config;

// == Cache Store ==
/// Memoizing cache that holds its values through weak references.
///
/// Values are handed out as `Arc<V>`. The store keeps only a [`WeakHandle`]
/// per key, so a value lives exactly as long as somebody holds it: a caller,
/// or the store's own retention ring when `retain_capacity > 0`.
///
/// # Key contract
/// `K`'s `Eq` and `Hash` must agree, and any borrowed form `Q` used for lookups
/// must hash and compare like the owned key. Violations are not detected; they
/// show up as spurious misses.
///
/// [`WeakHandle`]: crate::cache::WeakHandle
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Per-key weak handles
    entries: HashMap<K, CacheEntry<V>>,
    /// Strongly retained, most recently used values
    retention: RetentionRing<K, V>,
    /// Performance statistics
    stats: CacheStats,
    /// Max age applied to every new handle
    value_ttl: Option<Duration>,
}

impl<K, V> CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `retain_capacity` - Number of recently used values kept alive by the store (0 = none)
    /// * `value_ttl` - Optional max age after which a cached value is recomputed
    pub fn new(retain_capacity: usize, value_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            retention: RetentionRing::new(retain_capacity),
            stats: CacheStats::new(),
            value_ttl,
        }
    }

    /// Creates a CacheStore from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.retain_capacity, config.value_ttl())
    }

    // == Get Or Compute ==
    /// Returns the cached value for `key`, computing it on a miss.
    ///
    /// A hit returns the previously computed value without calling `compute`.
    /// On a miss `compute` runs once; its value is cached and returned. If it
    /// fails, the error is returned unchanged and the store is left as it was.
    ///
    /// # Arguments
    /// * `key` - Lookup key
    /// * `compute` - Produces the value for `key`; may be called again after reclamation
    pub fn get_or_compute<F, E>(&mut self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(value) = self.lookup(&key) {
            self.note_hit();
            return Ok(value);
        }

        self.note_miss(&key);
        match compute(&key) {
            Ok(fresh) => Ok(self.insert_computed(key, fresh)),
            Err(err) => {
                self.note_failure();
                Err(err)
            }
        }
    }

    // == Get Or Insert With ==
    /// Infallible form of [`get_or_compute`](Self::get_or_compute).
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        match self.get_or_compute(key, |k| Ok::<V, Infallible>(compute(k))) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    // == Get ==
    /// Returns the value if it is cached and still alive. Never computes.
    pub fn get<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.lookup(key) {
            Some(value) => {
                self.note_hit();
                Some(value)
            }
            None => {
                self.note_miss(key);
                None
            }
        }
    }

    /// Returns true if an entry exists for `key`, live or not.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Returns true if `key` would currently be a hit.
    pub fn is_live<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).is_some_and(CacheEntry::is_live)
    }

    pub fn entry<Q>(&self, key: &Q) -> Option<&CacheEntry<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key)
    }

    // == Invalidate ==
    /// Removes the entry for `key` and stops retaining its value.
    ///
    /// Returns true if an entry existed.
    pub fn invalidate<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.retention.release(key);
        let removed = self.entries.remove(key).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Removes every entry and releases every retained value.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.retention.clear();
        self.stats.set_total_entries(0);
    }

    // == Purge Reclaimed ==
    /// Removes all entries whose handle no longer resolves.
    ///
    /// Values past their max age are released from the retention ring as well.
    /// Returns the number of entries removed.
    pub fn purge_reclaimed(&mut self) -> usize {
        let dead_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_live())
            .map(|(key, _)| key.clone())
            .collect();

        let count = dead_keys.len();

        for key in dead_keys {
            self.entries.remove(&key);
            self.retention.release(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries, live or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of values currently kept alive by the store itself.
    pub fn retained_len(&self) -> usize {
        self.retention.len()
    }

    // == Internals shared with SharedCache ==

    /// Resolves `key` and refreshes its retention slot. Records nothing.
    pub(crate) fn lookup<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (stored_key, entry) = self.entries.get_key_value(key)?;
        let value = entry.resolve()?;

        if self.retention.capacity() > 0 {
            let evicted = self
                .retention
                .retain(stored_key.clone(), Arc::clone(&value));
            self.stats.record_evictions(evicted);
        }
        trace!("weak cache hit");
        Some(value)
    }

    pub(crate) fn note_hit(&mut self) {
        self.stats.record_hit();
    }

    pub(crate) fn note_miss<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let reclaimed = self.entries.contains_key(key);
        self.stats.record_miss(reclaimed);
        if reclaimed {
            trace!("weak cache miss: previous value was reclaimed");
        } else {
            trace!("weak cache miss: key not cached yet");
        }
    }

    pub(crate) fn note_failure(&mut self) {
        self.stats.record_failure();
        debug!("Compute failed, nothing cached");
    }

    pub(crate) fn note_coalesced(&mut self) {
        self.stats.record_coalesced();
    }

    /// A waiter that joined a computation which then failed.
    pub(crate) fn note_joined_failure(&mut self) {
        self.stats.record_miss(false);
    }

    /// Caches a freshly computed value and returns the caller's strong reference.
    pub(crate) fn insert_computed(&mut self, key: K, fresh: V) -> Arc<V> {
        let value = Arc::new(fresh);

        match self.entries.get_mut(&key) {
            Some(entry) => entry.replace(&value, self.value_ttl),
            None => {
                self.entries
                    .insert(key.clone(), CacheEntry::new(&value, self.value_ttl));
            }
        }

        let evicted = self.retention.retain(key, Arc::clone(&value));
        if evicted > 0 {
            debug!("Retention ring full: released {} value(s)", evicted);
        }

        self.stats.record_computation();
        self.stats.record_evictions(evicted);
        self.stats.set_total_entries(self.entries.len());
        value
    }
}

impl<K, V> Default for CacheStore<K, V>
where
    K: Eq + Hash + Clone,
{
    /// A pure weak cache: no retention, no max age.
    fn default() -> Self {
        Self::new(0, None)
    }
}
