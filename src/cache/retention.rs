//! Retention Ring Module
//!
//! Bounded Least Recently Used set of strong references that keeps the most
//! recently used values alive even after callers drop them.

use std::borrow::Borrow;
use std::collections::VecDeque;
use std::sync::Arc;

// == Retention Ring ==
/// Keeps up to `capacity` values strongly referenced, in LRU order.
///
/// Pairs are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Dropping a pair from the ring is the point where the cache stops keeping
/// the value alive; whether it is reclaimed then depends on outside holders.
#[derive(Debug)]
pub struct RetentionRing<K, V> {
    /// Retained values by access time
    order: VecDeque<(K, Arc<V>)>,
    /// Maximum number of retained values, 0 disables retention
    capacity: usize,
}

impl<K, V> RetentionRing<K, V>
where
    K: Eq,
{
    // == Constructor ==
    /// Creates a new empty ring holding at most `capacity` values.
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    // == Retain ==
    /// Marks `key` as most recently used and keeps `value` alive.
    ///
    /// If the key is already retained its previous value is replaced.
    /// Returns the number of values evicted from the back to stay within capacity.
    pub fn retain(&mut self, key: K, value: Arc<V>) -> usize {
        if self.capacity == 0 {
            return 0;
        }

        self.release(&key);
        self.order.push_front((key, value));

        let mut evicted = 0;
        while self.order.len() > self.capacity {
            self.order.pop_back();
            evicted += 1;
        }
        evicted
    }

    // == Release ==
    /// Stops retaining `key`. Returns true if it was retained.
    pub fn release<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let before = self.order.len();
        self.order.retain(|(k, _)| k.borrow() != key);
        self.order.len() != before
    }

    // == Oldest Key ==
    /// Returns the least recently used key without releasing it.
    pub fn oldest_key(&self) -> Option<&K> {
        self.order.back().map(|(key, _)| key)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of retained values.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Contains ==
    /// Checks if a key is being retained.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.order.iter().any(|(k, _)| k.borrow() == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn ring(capacity: usize) -> RetentionRing<String, u32> {
        RetentionRing::new(capacity)
    }

    #[test]
    fn test_ring_new() {
        let ring = ring(3);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 3);
    }

    #[test]
    fn test_ring_keeps_value_alive() {
        let mut ring = ring(2);
        let value = Arc::new(5);

        ring.retain("a".to_string(), Arc::clone(&value));
        assert_eq!(Arc::strong_count(&value), 2);

        ring.release("a");
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_ring_evicts_oldest_over_capacity() {
        let mut ring = ring(2);

        assert_eq!(ring.retain("a".to_string(), Arc::new(1)), 0);
        assert_eq!(ring.retain("b".to_string(), Arc::new(2)), 0);
        assert_eq!(ring.retain("c".to_string(), Arc::new(3)), 1);

        assert_eq!(ring.len(), 2);
        assert!(!ring.contains("a"));
        assert_eq!(ring.oldest_key().map(String::as_str), Some("b"));
    }

    #[test]
    fn test_ring_eviction_drops_strong_ref() {
        let mut ring = ring(1);
        let first = Arc::new(1);

        ring.retain("a".to_string(), Arc::clone(&first));
        ring.retain("b".to_string(), Arc::new(2));

        assert_eq!(Arc::strong_count(&first), 1);
    }

    #[test]
    fn test_ring_retain_existing_moves_to_front() {
        let mut ring = ring(3);

        ring.retain("a".to_string(), Arc::new(1));
        ring.retain("b".to_string(), Arc::new(2));
        ring.retain("c".to_string(), Arc::new(3));

        // Touch 'a' again - 'b' becomes the oldest
        ring.retain("a".to_string(), Arc::new(1));

        assert_eq!(ring.len(), 3);
        assert_eq!(ring.oldest_key().map(String::as_str), Some("b"));

        ring.retain("d".to_string(), Arc::new(4));
        assert!(!ring.contains("b"));
        assert!(ring.contains("a"));
    }

    #[test]
    fn test_ring_retain_replaces_value() {
        let mut ring = ring(2);
        let old = Arc::new(1);

        ring.retain("a".to_string(), Arc::clone(&old));
        ring.retain("a".to_string(), Arc::new(2));

        assert_eq!(ring.len(), 1);
        assert_eq!(Arc::strong_count(&old), 1);
    }

    #[test]
    fn test_ring_zero_capacity_retains_nothing() {
        let mut ring = ring(0);
        let value = Arc::new(1);

        assert_eq!(ring.retain("a".to_string(), Arc::clone(&value)), 0);
        assert!(ring.is_empty());
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[test]
    fn test_ring_release_nonexistent_key() {
        let mut ring = ring(2);
        ring.retain("a".to_string(), Arc::new(1));

        assert!(!ring.release("missing"));
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_ring_clear() {
        let mut ring = ring(4);
        ring.retain("a".to_string(), Arc::new(1));
        ring.retain("b".to_string(), Arc::new(2));

        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.oldest_key(), None);
    }
}
