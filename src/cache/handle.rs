//! Weak Handle Module
//!
//! A reference to a computed value that does not keep the value alive.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

// == Weak Handle ==
/// Weak reference to a cached value with an optional max age.
///
/// Resolution fails once every strong `Arc` to the value has been dropped, or
/// once the max age has elapsed. Both conditions are permanent: a dropped
/// `Arc` cannot be revived and `Instant` never goes backwards.
#[derive(Debug)]
pub struct WeakHandle<V> {
    /// Non-owning pointer to the value
    weak: Weak<V>,
    /// Deadline after which the handle no longer resolves, None = no max age
    expires_at: Option<Instant>,
}

impl<V> WeakHandle<V> {
    // == Constructor ==
    /// Creates a handle to `value`, optionally bounded by `max_age`.
    pub fn new(value: &Arc<V>, max_age: Option<Duration>) -> Self {
        Self {
            weak: Arc::downgrade(value),
            expires_at: max_age.and_then(|age| Instant::now().checked_add(age)),
        }
    }

    // == Resolve ==
    /// Returns the value if it is still alive and not past its max age.
    pub fn resolve(&self) -> Option<Arc<V>> {
        if self.is_expired() {
            return None;
        }
        self.weak.upgrade()
    }

    // == Is Live ==
    /// Returns true if `resolve` would currently succeed.
    pub fn is_live(&self) -> bool {
        !self.is_expired() && self.weak.strong_count() > 0
    }

    // == Is Expired ==
    /// Checks the max age only, regardless of reachability.
    ///
    /// The boundary counts as expired: once `now >= expires_at` the handle is stale.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Deadline after which the handle stops resolving.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}

impl<V> Clone for WeakHandle<V> {
    fn clone(&self) -> Self {
        Self {
            weak: Weak::clone(&self.weak),
            expires_at: self.expires_at,
        }
    }
}
