//! Background Tasks Module
//!
//! Contains background tasks that callers may spawn next to a shared cache.
//!
//! # Tasks
//! - Purge: Removes entries whose values have been reclaimed, at a fixed interval

mod purge;

pub use purge::{spawn_purge_task, spawn_purge_task_every};
