//! Error types for the weak cache
//!
//! Provides unified error handling using thiserror.
//!
//! The synchronous API hands the caller's own compute error back unchanged, so
//! `CacheError` only shows up where a failure has to be shared between several
//! waiters (async computations) or where configuration is rejected.

use std::sync::Arc;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the weak cache.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The compute function failed; shared by every waiter of that computation
    #[error("Compute failed: {0}")]
    Compute(Arc<anyhow::Error>),

    /// The spawned computation panicked or was aborted before completing
    #[error("Compute task aborted: {0}")]
    TaskAborted(String),

    /// Rejected configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Wraps a compute failure so it can be cloned to every waiter.
    pub fn compute(err: anyhow::Error) -> Self {
        CacheError::Compute(Arc::new(err))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the weak cache.
pub type Result<T> = std::result::Result<T, CacheError>;
