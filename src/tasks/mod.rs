//! Background Tasks Module
//!
//! # Tasks
//! - TTL Cleanup: opt-in sweep of expired cache entries

mod cleanup;

pub use cleanup::spawn_cleanup_task;
