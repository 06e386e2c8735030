//! Shared helpers for integration tests.

use std::sync::Arc;

use query_cache::api;
use query_cache::transport::mock::MockTransport;
use query_cache::transport::{CredentialSource, TokenStore};
use query_cache::{CacheStore, Config};

/// Store wired with the full endpoint table and bearer auth.
pub fn store_over(transport: Arc<MockTransport>, eviction_grace_secs: u64) -> (CacheStore, Arc<TokenStore>) {
    let config = Config {
        eviction_grace: eviction_grace_secs,
        ..Config::default()
    };
    let tokens = Arc::new(TokenStore::new());
    let credentials: Arc<dyn CredentialSource> = tokens.clone();
    let store = api::store_with_transport(&config, transport, credentials).unwrap();
    (store, tokens)
}
