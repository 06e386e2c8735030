//! Transport Module
//!
//! Collaborators injected by the host: the transport performing physical
//! HTTP calls and the credential source consulted before each of them.

mod credentials;
mod http;
pub mod mock;

use async_trait::async_trait;

use crate::endpoint::RequestSpec;
use crate::error::TransportError;

pub use credentials::{CredentialSource, TokenStore};
pub use http::HttpTransport;

// == Transport Response ==
/// Raw response: status code plus undecoded body text.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 response with a JSON body.
    pub fn ok_json(body: &serde_json::Value) -> Self {
        Self::new(200, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// == Transport Trait ==
/// Performs one physical call. The request layer never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &RequestSpec,
    ) -> std::result::Result<TransportResponse, TransportError>;
}
