//! Weak Cache - a lazy memoizing key-value cache
//!
//! Values are computed on demand and cached through weak references: a cached
//! value is reused for as long as something else keeps it alive, and is
//! recomputed transparently once it has been dropped. An optional retention
//! ring and max value age make eviction deterministic.
//!
//! ```
//! use weak_cache::CacheStore;
//!
//! let mut store = CacheStore::default();
//! let pi = store.get_or_insert_with("pi", |_| 3.5);
//! let again = store.get_or_insert_with("pi", |_| 0.0);
//! assert_eq!(*again, 3.5);
//! # drop(pi);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheStore, RetentionRing, SharedCache, WeakHandle};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::{spawn_purge_task, spawn_purge_task_every};
