//! In-flight computations
//!
//! Bookkeeping that lets concurrent callers for the same key wait on a single
//! computation instead of starting their own.

use std::sync::Arc;

use futures_util::future::{BoxFuture, Shared};
use parking_lot::{Condvar, Mutex};

use crate::error::Result;

/// A computation shared by every async caller of one key.
pub(crate) type PendingLoad<V> = Shared<BoxFuture<'static, Result<Arc<V>>>>;

enum LoadState<V> {
    Computing,
    Complete(Arc<V>),
    /// The leader failed or panicked; waiters must start over.
    Abandoned,
}

/// A computation being run by a leader thread, waited on by follower threads.
pub(crate) struct Loading<V> {
    state: Mutex<LoadState<V>>,
    ready: Condvar,
}

impl<V> Loading<V> {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LoadState::Computing),
            ready: Condvar::new(),
        }
    }

    /// Publishes the value and wakes all waiters.
    pub(crate) fn complete(&self, value: Arc<V>) {
        *self.state.lock() = LoadState::Complete(value);
        self.ready.notify_all();
    }

    pub(crate) fn abandon(&self) {
        let mut state = self.state.lock();
        if matches!(*state, LoadState::Computing) {
            *state = LoadState::Abandoned;
        }
        drop(state);
        self.ready.notify_all();
    }

    /// Blocks until the leader finishes. `None` means it produced nothing.
    pub(crate) fn wait(&self) -> Option<Arc<V>> {
        let mut state = self.state.lock();
        loop {
            match &*state {
                LoadState::Computing => self.ready.wait(&mut state),
                LoadState::Complete(value) => return Some(Arc::clone(value)),
                LoadState::Abandoned => return None,
            }
        }
    }
}
