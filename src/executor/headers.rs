//! Header Hook
//!
//! Augments outgoing requests right before the physical transport call.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::transport::CredentialSource;

/// Header map of an outgoing request.
pub type Headers = BTreeMap<String, String>;

/// Hook invoked once per physical call, never once per waiter.
pub trait PrepareHeaders: Send + Sync {
    fn prepare(&self, headers: &mut Headers);
}

impl<F> PrepareHeaders for F
where
    F: Fn(&mut Headers) + Send + Sync,
{
    fn prepare(&self, headers: &mut Headers) {
        self(headers)
    }
}

// == Bearer Auth ==
/// Sets `Authorization: Bearer <token>` when the credential source has a
/// token, and always marks the body as JSON.
#[derive(Clone)]
pub struct BearerAuth {
    credentials: Arc<dyn CredentialSource>,
}

impl BearerAuth {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self { credentials }
    }
}

impl PrepareHeaders for BearerAuth {
    fn prepare(&self, headers: &mut Headers) {
        if let Some(token) = self.credentials.current_token() {
            headers.insert("Authorization".to_string(), format!("Bearer {}", token));
        }
        headers.insert("Content-Type".to_string(), "application/json".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TokenStore;

    #[test]
    fn test_bearer_auth_with_token() {
        let tokens = Arc::new(TokenStore::new());
        tokens.set_token("secret");
        let hook = BearerAuth::new(tokens);

        let mut headers = Headers::new();
        hook.prepare(&mut headers);

        assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer secret"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn test_bearer_auth_without_token_omits_header() {
        let hook = BearerAuth::new(Arc::new(TokenStore::new()));

        let mut headers = Headers::new();
        hook.prepare(&mut headers);

        assert!(!headers.contains_key("Authorization"));
        assert!(headers.contains_key("Content-Type"));
    }

    #[test]
    fn test_closure_hook() {
        let hook = |headers: &mut Headers| {
            headers.insert("X-Trace".to_string(), "1".to_string());
        };
        let mut headers = Headers::new();
        PrepareHeaders::prepare(&hook, &mut headers);
        assert_eq!(headers.len(), 1);
    }
}
