//! Cache Module
//!
//! Provides the in-memory request cache: canonical keys, entries with their
//! lifecycle, subscriptions and the store coordinating them.

mod entry;
mod key;
mod stats;
mod store;
mod subscription;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, EntryStatus};
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{CacheStore, StoreConfig};
pub use subscription::{EntryWatch, SubscriberId, Subscription};
