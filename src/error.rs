//! Error types for the request cache
//!
//! Provides unified error handling using thiserror.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// == Transport Error ==
/// Raw failure reported by a transport collaborator.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TransportError {
    /// The call did not complete in time
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Connection refused, reset, DNS failure and the like
    #[error("Network failure: {0}")]
    Network(String),
}

// == Request Error ==
/// Failure outcome of a request, as stored on a cache entry and delivered
/// to every waiter of the call.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestError {
    /// The transport could not complete the call
    #[error(transparent)]
    Transport(TransportError),

    /// The response body was not valid JSON
    #[error("Malformed response body: {detail}")]
    Decode { detail: String, body: String },

    /// The server answered with a non-success status
    #[error("Server responded with status {status}")]
    Status { status: u16, body: Value },
}

impl RequestError {
    /// Stable code for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            RequestError::Transport(TransportError::Timeout(_)) => "TIMEOUT_ERROR",
            RequestError::Transport(TransportError::Network(_)) => "FETCH_ERROR",
            RequestError::Decode { .. } => "PARSING_ERROR",
            RequestError::Status { .. } => "HTTP_ERROR",
        }
    }
}

impl From<TransportError> for RequestError {
    fn from(err: TransportError) -> Self {
        RequestError::Transport(err)
    }
}

// == Cache Error Enum ==
/// Unified error type for the request cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No endpoint registered under this name
    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    /// An endpoint with this name is already registered
    #[error("Duplicate endpoint: {0}")]
    DuplicateEndpoint(String),

    /// Arguments cannot be turned into a request for the endpoint
    #[error("Invalid arguments for {endpoint}: {reason}")]
    InvalidArguments { endpoint: String, reason: String },

    /// A query was used as a mutation or the other way round
    #[error("Endpoint {endpoint} is a {actual}, expected a {expected}")]
    WrongEndpointKind {
        endpoint: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Fetches run on tokio tasks; there is no runtime to spawn them on
    #[error("No tokio runtime available to run requests")]
    NoRuntime,

    /// The request itself failed
    #[error(transparent)]
    Request(#[from] RequestError),
}

// == Result Type Alias ==
/// Convenience Result type for the request cache.
pub type Result<T> = std::result::Result<T, CacheError>;
