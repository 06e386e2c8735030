//! Endpoint Registry Module
//!
//! Name-indexed table of endpoint descriptors. Filled once during start-up,
//! then shared read-only behind an `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::endpoint::EndpointDescriptor;
use crate::error::{CacheError, Result};

// == Endpoint Registry ==
#[derive(Debug, Default)]
pub struct EndpointRegistry {
    endpoints: HashMap<&'static str, Arc<EndpointDescriptor>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Register ==
    /// Adds a descriptor. Fails with `DuplicateEndpoint` if the name is taken.
    pub fn register(&mut self, descriptor: EndpointDescriptor) -> Result<()> {
        let name = descriptor.name();
        if self.endpoints.contains_key(name) {
            return Err(CacheError::DuplicateEndpoint(name.to_string()));
        }
        debug!(endpoint = name, kind = %descriptor.kind(), "Registered endpoint");
        self.endpoints.insert(name, Arc::new(descriptor));
        Ok(())
    }

    // == Resolve ==
    /// Looks a descriptor up by name. Fails with `UnknownEndpoint` otherwise.
    pub fn resolve(&self, name: &str) -> Result<Arc<EndpointDescriptor>> {
        self.endpoints
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownEndpoint(name.to_string()))
    }

    /// Freezes the registry for sharing.
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}
