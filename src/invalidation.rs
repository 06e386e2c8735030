//! Invalidation Coordinator
//!
//! The only path from a mutation to query caches: a successful mutation's
//! declared tags are handed to the store, which refreshes every entry
//! providing one of them. Queries and mutations never reference each other.

use serde_json::Value;
use tracing::debug;

use crate::cache::CacheStore;
use crate::endpoint::EndpointDescriptor;

pub struct InvalidationCoordinator<'a> {
    store: &'a CacheStore,
}

impl<'a> InvalidationCoordinator<'a> {
    pub fn new(store: &'a CacheStore) -> Self {
        Self { store }
    }

    /// Invalidates the tags `endpoint` declares for `args`. Returns the number
    /// of entries hit; every one of them has left its fresh `Success` state
    /// by the time this returns.
    pub fn on_mutation_success(
        &self,
        endpoint: &EndpointDescriptor,
        args: &Value,
        _result: &Value,
    ) -> usize {
        let tags = endpoint.invalidates_tags(args);
        if tags.is_empty() {
            debug!(endpoint = endpoint.name(), "Mutation declares no tags");
            return 0;
        }
        self.store.invalidate_tags(&tags)
    }
}
