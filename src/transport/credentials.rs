//! Credential Store
//!
//! Source of the bearer token attached to outgoing requests.

use parking_lot::RwLock;

/// Supplies the current session token, if any.
pub trait CredentialSource: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

// == Token Store ==
/// In-memory token holder for one session.
#[derive(Debug, Default)]
pub struct TokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored token.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Forgets the stored token (logout).
    pub fn clear(&self) {
        *self.token.write() = None;
    }
}

impl CredentialSource for TokenStore {
    fn current_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
