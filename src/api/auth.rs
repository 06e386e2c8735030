//! Auth Endpoints
//!
//! # Endpoints
//! - `registerUser` - `POST /api/auth/register`
//! - `login` - `POST /api/auth/login`, answers `{ "token": ... }`
//!
//! Neither declares tags.

use serde_json::Value;
use tracing::info;

use crate::api::etudiants::to_args;
use crate::cache::CacheStore;
use crate::endpoint::{EndpointDescriptor, RequestSpec};
use crate::error::{CacheError, RequestError, Result};
use crate::models::{Credentials, LoginResponse};
use crate::transport::TokenStore;

pub const REGISTER_USER: &str = "registerUser";
pub const LOGIN: &str = "login";

pub fn endpoints() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::mutation(REGISTER_USER, build_register),
        EndpointDescriptor::mutation(LOGIN, build_login),
    ]
}

fn build_register(args: &Value) -> std::result::Result<RequestSpec, String> {
    if !args.is_object() {
        return Err("body must be a JSON object".to_string());
    }
    Ok(RequestSpec::post("/api/auth/register", args.clone()))
}

fn build_login(args: &Value) -> std::result::Result<RequestSpec, String> {
    let credentials: Credentials = serde_json::from_value(args.clone()).map_err(|e| e.to_string())?;
    if let Some(reason) = credentials.validate() {
        return Err(reason);
    }
    Ok(RequestSpec::post("/api/auth/login", args.clone()))
}

/// Logs in and stores the returned token for subsequent requests.
pub async fn login(
    store: &CacheStore,
    tokens: &TokenStore,
    credentials: &Credentials,
) -> Result<LoginResponse> {
    let body = store.mutate(LOGIN, to_args(LOGIN, credentials)?).await?;
    let response: LoginResponse = serde_json::from_value(body.clone()).map_err(|e| {
        CacheError::Request(RequestError::Decode {
            detail: e.to_string(),
            body: body.to_string(),
        })
    })?;

    tokens.set_token(response.token.clone());
    info!(email = %credentials.email, "Logged in");
    Ok(response)
}

/// Creates an account. The session token is left untouched.
pub async fn register(store: &CacheStore, user: &Credentials) -> Result<Value> {
    if let Some(reason) = user.validate() {
        return Err(CacheError::InvalidArguments {
            endpoint: REGISTER_USER.to_string(),
            reason,
        });
    }
    store.mutate(REGISTER_USER, to_args(REGISTER_USER, user)?).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::api::registry;
    use crate::cache::StoreConfig;
    use crate::executor::RequestExecutor;
    use crate::transport::mock::MockTransport;
    use crate::transport::{CredentialSource, TransportResponse};
    use serde_json::json;

    fn store(transport: Arc<MockTransport>) -> CacheStore {
        CacheStore::new(
            registry().unwrap().into_shared(),
            RequestExecutor::new(transport),
            StoreConfig::default(),
        )
    }

    #[test]
    fn test_login_requires_credentials() {
        assert!(build_login(&json!({"email": "a@b.c", "password": "x"})).is_ok());
        assert!(build_login(&json!({"email": "a@b.c"})).is_err());
        assert!(build_login(&json!({"email": "", "password": "x"})).is_err());
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_json("/api/auth/login", json!({"token": "jwt-123"}));
        let store = store(transport.clone());
        let tokens = TokenStore::new();

        let response = login(&store, &tokens, &Credentials::new("admin@school.ma", "pw"))
            .await
            .unwrap();

        assert_eq!(response.token, "jwt-123");
        assert_eq!(tokens.current_token().as_deref(), Some("jwt-123"));
        assert_eq!(
            transport.calls()[0].body,
            Some(json!({"email": "admin@school.ma", "password": "pw"}))
        );
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_token_empty() {
        let transport = Arc::new(MockTransport::new());
        transport.respond(
            "/api/auth/login",
            TransportResponse::new(401, r#"{"message":"Invalid credentials"}"#),
        );
        let store = store(transport);
        let tokens = TokenStore::new();

        let result = login(&store, &tokens, &Credentials::new("admin@school.ma", "bad")).await;
        match result {
            Err(CacheError::Request(RequestError::Status { status, body })) => {
                assert_eq!(status, 401);
                assert_eq!(body["message"], "Invalid credentials");
            }
            other => panic!("expected 401, got {:?}", other),
        }
        assert!(tokens.current_token().is_none());
    }

    #[tokio::test]
    async fn test_login_without_token_field_is_decode_error() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_json("/api/auth/login", json!({"ok": true}));
        let store = store(transport);

        let result = login(&store, &TokenStore::new(), &Credentials::new("a@b.c", "pw")).await;
        assert!(matches!(result, Err(CacheError::Request(RequestError::Decode { .. }))));
    }

    #[tokio::test]
    async fn test_register_posts_user() {
        let transport = Arc::new(MockTransport::new());
        transport.respond_json("/api/auth/register", json!({"id": 1}));
        let store = store(transport.clone());

        let body = register(&store, &Credentials::new("new@school.ma", "pw")).await.unwrap();
        assert_eq!(body, json!({"id": 1}));
        assert_eq!(transport.calls()[0].path, "/api/auth/register");
    }
}
