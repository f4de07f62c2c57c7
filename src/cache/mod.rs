//! Cache Module
//!
//! Provides a memoizing cache whose values are held through weak references,
//! with an optional LRU retention ring and max value age.

mod entry;
mod handle;
mod loading;
mod retention;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use handle::WeakHandle;
pub use retention::RetentionRing;
pub use shared::SharedCache;
pub use stats::CacheStats;
pub use store::CacheStore;
