//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the compute-or-fetch contract over random sequences.

use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::cache::CacheStore;

// == Strategies ==
/// Generates cache keys
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_]{1,12}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    /// get_or_compute, keeping the result alive if `hold` is set
    Fetch { key: String, hold: bool },
    /// Drop every value held by the test
    DropHeld,
    Invalidate { key: String },
    Purge,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), any::<bool>()).prop_map(|(key, hold)| CacheOp::Fetch { key, hold }),
        1 => Just(CacheOp::DropHeld),
        1 => key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
        1 => Just(CacheOp::Purge),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // **Property 1: Hit Reuse**
    // While a value is held, fetching its key again returns the same Arc and
    // never calls compute.
    #[test]
    fn prop_hit_reuse(keys in prop::collection::vec(key_strategy(), 1..40)) {
        let mut store = CacheStore::default();
        let calls = Cell::new(0usize);
        let mut held: HashMap<String, Arc<usize>> = HashMap::new();

        for key in &keys {
            let value = store.get_or_insert_with(key.clone(), |k| {
                calls.set(calls.get() + 1);
                k.len()
            });
            if let Some(previous) = held.get(key) {
                prop_assert!(Arc::ptr_eq(previous, &value));
            }
            held.insert(key.clone(), value);
        }

        let distinct: HashSet<&String> = keys.iter().collect();
        prop_assert_eq!(calls.get(), distinct.len());
    }

    // **Property 2: Recompute After Reclamation**
    // In a pure weak cache, a value nobody holds is gone: every fetch of an
    // unheld key computes again.
    #[test]
    fn prop_unheld_values_are_recomputed(keys in prop::collection::vec(key_strategy(), 1..40)) {
        let mut store = CacheStore::default();
        let calls = Cell::new(0usize);

        for key in &keys {
            let value = store.get_or_insert_with(key.clone(), |k| {
                calls.set(calls.get() + 1);
                format!("computed {k}")
            });
            prop_assert_eq!(value.as_str(), format!("computed {key}"));
        }

        prop_assert_eq!(calls.get(), keys.len());

        let distinct = keys.iter().collect::<HashSet<_>>().len();
        prop_assert_eq!(store.len(), distinct);
        prop_assert_eq!(store.purge_reclaimed(), distinct);
        prop_assert!(store.is_empty());
    }

    // **Property 3: Key Isolation**
    // Distinct keys never share a cached value, even if the values are equal.
    #[test]
    fn prop_key_isolation(a in key_strategy(), b in key_strategy()) {
        prop_assume!(a != b);
        let mut store = CacheStore::default();

        let first = store.get_or_insert_with(a, |_| 42u64);
        let second = store.get_or_insert_with(b, |_| 42u64);

        prop_assert_eq!(&first, &second);
        prop_assert!(!Arc::ptr_eq(&first, &second));
    }

    // **Property 4: Failure Non-Caching**
    // A failed compute leaves no trace; the next call runs its own compute.
    #[test]
    fn prop_failure_not_cached(key in key_strategy(), value in any::<u32>()) {
        let mut store: CacheStore<String, u32> = CacheStore::default();

        let failed = store.get_or_compute(key.clone(), |_| Err("unavailable"));
        prop_assert!(failed.is_err());
        prop_assert!(!store.contains_key(&key));

        let called = Cell::new(false);
        let fresh = store
            .get_or_compute(key.clone(), |_| {
                called.set(true);
                Ok::<_, &str>(value)
            })
            .unwrap();
        prop_assert!(called.get());
        prop_assert_eq!(*fresh, value);
    }

    // **Property 5: Retention Bound**
    // The store never keeps more values alive than its retention capacity.
    #[test]
    fn prop_retention_bound(
        capacity in 0usize..8,
        keys in prop::collection::vec(key_strategy(), 1..60)
    ) {
        let mut store = CacheStore::new(capacity, None);

        for key in keys {
            drop(store.get_or_insert_with(key, |k| k.len()));
            prop_assert!(store.retained_len() <= capacity);
        }
    }

    // **Property 6: Statistics Accuracy**
    // For any sequence of operations, hits + misses equals the number of
    // fetches, every miss computes, and held values are always hits.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store: CacheStore<String, String> = CacheStore::default();
        let mut held: Vec<Arc<String>> = Vec::new();
        let mut fetches = 0u64;
        let mut expected_hits = 0u64;

        for op in ops {
            match op {
                CacheOp::Fetch { key, hold } => {
                    fetches += 1;
                    let live_before = store.is_live(&key);
                    let value = store.get_or_insert_with(key.clone(), |k| k.to_uppercase());
                    if live_before {
                        expected_hits += 1;
                    }
                    prop_assert_eq!(value.as_str(), key.to_uppercase());
                    if hold {
                        held.push(value);
                    }
                }
                CacheOp::DropHeld => held.clear(),
                CacheOp::Invalidate { key } => {
                    store.invalidate(&key);
                }
                CacheOp::Purge => {
                    store.purge_reclaimed();
                }
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits + stats.misses, fetches);
        prop_assert_eq!(stats.hits, expected_hits);
        prop_assert_eq!(stats.computations, stats.misses);
        prop_assert_eq!(stats.total_entries, store.len());
    }
}
