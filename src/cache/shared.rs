//! Shared Cache Module
//!
//! Thread-safe handle around a [`CacheStore`] that keeps at most one
//! computation per key in flight.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures_util::FutureExt;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::loading::{Loading, PendingLoad};
use crate::cache::{CacheStats, CacheStore};
use crate::config::Config;
use crate::error::{CacheError, Result};

struct State<K, V> {
    store: CacheStore<K, V>,
    /// Computations run by a blocked leader thread
    loading: HashMap<K, Arc<Loading<V>>>,
    /// Computations running as tokio tasks
    pending: HashMap<K, PendingLoad<V>>,
}

struct Inner<K, V> {
    state: Mutex<State<K, V>>,
}

// == Shared Cache ==
/// Cloneable, thread-safe weak cache.
///
/// Clones share the same store. The lock guards only the lookup and the map
/// update; compute functions run without it, and concurrent callers for a key
/// that is already being computed wait for that computation.
///
/// Blocking and async callers coalesce among themselves but not with each other.
pub struct SharedCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for SharedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Wraps an existing store.
    pub fn new(store: CacheStore<K, V>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    store,
                    loading: HashMap::new(),
                    pending: HashMap::new(),
                }),
            }),
        }
    }

    /// Creates a SharedCache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheStore::from_config(config))
    }

    // == Get Or Compute ==
    /// Blocking compute-or-fetch.
    ///
    /// Same contract as [`CacheStore::get_or_compute`]. If another thread is
    /// already computing `key`, this call blocks until it finishes and returns
    /// its value. If that computation fails or panics, this caller starts over
    /// and may run its own `compute`.
    pub fn get_or_compute<F, E>(&self, key: K, compute: F) -> std::result::Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> std::result::Result<V, E>,
    {
        loop {
            let loading = {
                let mut state = self.inner.state.lock();
                if let Some(value) = state.store.lookup(&key) {
                    state.store.note_hit();
                    return Ok(value);
                }

                match state.loading.get(&key).cloned() {
                    Some(loading) => loading,
                    None => {
                        state.store.note_miss(&key);
                        let loading = Arc::new(Loading::new());
                        state.loading.insert(key.clone(), Arc::clone(&loading));
                        drop(state);
                        return self.lead(key, loading, compute);
                    }
                }
            };

            // Counted only once the outcome is known; a failed leader sends
            // this caller round the loop as a fresh request.
            if let Some(value) = loading.wait() {
                self.inner.state.lock().store.note_coalesced();
                return Ok(value);
            }
            debug!("In-flight computation produced nothing, retrying");
        }
    }

    /// Runs `compute` as the single leader for `key`.
    fn lead<F, E>(
        &self,
        key: K,
        loading: Arc<Loading<V>>,
        compute: F,
    ) -> std::result::Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> std::result::Result<V, E>,
    {
        let mut guard = LeaderGuard {
            inner: &self.inner,
            key: &key,
            loading: &loading,
            armed: true,
        };

        let outcome = compute(&key);
        guard.armed = false;

        let mut state = self.inner.state.lock();
        state.loading.remove(&key);
        match outcome {
            Ok(fresh) => {
                let value = state.store.insert_computed(key.clone(), fresh);
                drop(state);
                loading.complete(Arc::clone(&value));
                Ok(value)
            }
            Err(err) => {
                state.store.note_failure();
                drop(state);
                loading.abandon();
                Err(err)
            }
        }
    }

    // == Get ==
    /// Returns the value if it is cached and still alive. Never computes.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.state.lock().store.get(key)
    }

    /// Removes the entry for `key`. In-flight computations still complete.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.state.lock().store.invalidate(key)
    }

    pub fn clear(&self) {
        self.inner.state.lock().store.clear();
    }

    /// See [`CacheStore::purge_reclaimed`].
    pub fn purge_reclaimed(&self) -> usize {
        self.inner.state.lock().store.purge_reclaimed()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.state.lock().store.stats()
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().store.is_empty()
    }
}

impl<K, V> SharedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    // == Get Or Compute Async ==
    /// Async compute-or-fetch; must be called within a tokio runtime.
    ///
    /// On a miss the future returned by `compute` is spawned as its own task and
    /// every concurrent caller for `key` awaits that one task. Dropping one of
    /// the awaiting futures does not cancel the computation for the others.
    ///
    /// `compute` itself is called while the cache lock is held, so it should
    /// only build the future and leave the work to it.
    ///
    /// # Errors
    /// - `CacheError::Compute` if the computation returned an error
    /// - `CacheError::TaskAborted` if it panicked or the runtime dropped it
    pub async fn get_or_compute_async<F, Fut>(&self, key: K, compute: F) -> Result<Arc<V>>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let (load, joined) = {
            let mut state = self.inner.state.lock();
            if let Some(value) = state.store.lookup(&key) {
                state.store.note_hit();
                return Ok(value);
            }

            if let Some(load) = state.pending.get(&key).cloned() {
                (load, true)
            } else {
                state.store.note_miss(&key);
                let load = self.spawn_load(key.clone(), compute(key.clone()));
                state.pending.insert(key, load.clone());
                (load, false)
            }
        };

        let outcome = load.await;
        if joined {
            // A joined waiter is a hit only if the shared computation produced
            // a value; otherwise it shares the failure and counts as a miss.
            let mut state = self.inner.state.lock();
            match &outcome {
                Ok(_) => state.store.note_coalesced(),
                Err(_) => state.store.note_joined_failure(),
            }
        }
        outcome
    }

    /// Spawns the computation; the task settles the cache itself so the
    /// outcome is recorded even if every waiter went away.
    ///
    /// Called with the state lock held: the task cannot settle before the
    /// caller has registered the returned load.
    fn spawn_load<Fut>(&self, key: K, fut: Fut) -> PendingLoad<V>
    where
        Fut: Future<Output = anyhow::Result<V>> + Send + 'static,
    {
        let guard = PendingGuard {
            inner: Arc::clone(&self.inner),
            key,
            armed: true,
        };

        let handle = tokio::spawn(async move {
            let outcome = fut.await;
            guard.settle(outcome)
        });

        handle
            .map(|joined| match joined {
                Ok(result) => result,
                Err(err) => {
                    warn!("Compute task did not complete: {}", err);
                    Err(CacheError::TaskAborted(err.to_string()))
                }
            })
            .boxed()
            .shared()
    }
}

impl<K, V> Default for SharedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(CacheStore::default())
    }
}

// == Guards ==

/// Clears the in-flight marker if a blocking leader unwinds out of `compute`.
struct LeaderGuard<'a, K: Eq + Hash, V> {
    inner: &'a Inner<K, V>,
    key: &'a K,
    loading: &'a Arc<Loading<V>>,
    armed: bool,
}

impl<K: Eq + Hash, V> Drop for LeaderGuard<'_, K, V> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.inner.state.lock();
        if state
            .loading
            .get(self.key)
            .is_some_and(|current| Arc::ptr_eq(current, self.loading))
        {
            state.loading.remove(self.key);
        }
        drop(state);
        self.loading.abandon();
    }
}

/// Owned by the spawned task; removes the pending marker however the task ends.
struct PendingGuard<K: Eq + Hash, V> {
    inner: Arc<Inner<K, V>>,
    key: K,
    armed: bool,
}

impl<K, V> PendingGuard<K, V>
where
    K: Eq + Hash + Clone,
{
    fn settle(mut self, outcome: anyhow::Result<V>) -> Result<Arc<V>> {
        self.armed = false;
        let mut state = self.inner.state.lock();
        state.pending.remove(&self.key);
        match outcome {
            Ok(fresh) => Ok(state.store.insert_computed(self.key.clone(), fresh)),
            Err(err) => {
                state.store.note_failure();
                Err(CacheError::compute(err))
            }
        }
    }
}

impl<K: Eq + Hash, V> Drop for PendingGuard<K, V> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.state.lock().pending.remove(&self.key);
        }
    }
}
