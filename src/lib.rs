//! Query Cache - tag-based request cache for the student admin interface
//!
//! Deduplicates concurrent identical requests, caches responses by endpoint
//! and arguments, tracks subscribers per entry, and refetches entries whose
//! tags a successful mutation invalidates.

pub mod api;
pub mod cache;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod executor;
pub mod invalidation;
pub mod models;
pub mod tasks;
pub mod transport;

pub use cache::{CacheEntry, CacheKey, CacheStore, EntryStatus, EntryWatch, Subscription};
pub use config::Config;
pub use endpoint::{EndpointDescriptor, EndpointKind, EndpointRegistry, RequestSpec, Tag, TagSet};
pub use error::{CacheError, RequestError, Result, TransportError};
pub use tasks::spawn_eviction_task;
