//! API Module
//!
//! Endpoint table of the student admin backend and the wiring that turns a
//! `Config` into a ready-to-use cache store.
//!
//! # Endpoints
//! - `getAllEtudiants` - paginated student list (query)
//! - `getEtudiant` - single student (query)
//! - `addEtudiant` - create a student (mutation)
//! - `registerUser` - create an account (mutation)
//! - `login` - obtain a session token (mutation)

pub mod auth;
pub mod etudiants;

use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::endpoint::EndpointRegistry;
use crate::error::{RequestError, Result};
use crate::executor::{BearerAuth, RequestExecutor};
use crate::transport::{CredentialSource, HttpTransport, Transport};

/// Registry holding every endpoint of the backend.
pub fn registry() -> Result<EndpointRegistry> {
    let mut registry = EndpointRegistry::new();
    for descriptor in etudiants::endpoints().into_iter().chain(auth::endpoints()) {
        registry.register(descriptor)?;
    }
    Ok(registry)
}

/// Store over `transport`, attaching the bearer token from `credentials`.
pub fn store_with_transport(
    config: &Config,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
) -> Result<CacheStore> {
    let executor = RequestExecutor::with_hook(transport, Arc::new(BearerAuth::new(credentials)));
    Ok(CacheStore::new(
        registry()?.into_shared(),
        executor,
        config.store_config(),
    ))
}

/// Store talking HTTP to `config.api_base_url`.
pub fn store_from_config(
    config: &Config,
    credentials: Arc<dyn CredentialSource>,
) -> Result<CacheStore> {
    let transport = HttpTransport::from_config(config).map_err(RequestError::from)?;
    store_with_transport(config, Arc::new(transport), credentials)
}
