//! Background Tasks Module
//!
//! Contains background tasks that run periodically during a session.
//!
//! # Tasks
//! - Eviction: Removes cache entries unused for longer than the grace period

mod eviction;

pub use eviction::spawn_eviction_task;
