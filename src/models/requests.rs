//! Request DTOs for the student API
//!
//! Defines the arguments passed to query and mutation endpoints.

use serde::{Deserialize, Serialize};

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

/// Arguments of `getAllEtudiants`
///
/// # Fields
/// - `page`: 1-based page number (default 1)
/// - `limit`: page size (default 10)
/// - `search`: free-text filter (default empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtudiantListParams {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: String,
}

impl Default for EtudiantListParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: String::new(),
        }
    }
}

impl EtudiantListParams {
    pub fn new(page: u32, limit: u32, search: impl Into<String>) -> Self {
        Self {
            page,
            limit,
            search: search.into(),
        }
    }

    /// Validates the parameters
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.page == 0 {
            return Some("page starts at 1".to_string());
        }
        if self.limit == 0 {
            return Some("limit must be at least 1".to_string());
        }
        None
    }
}

/// Body of `addEtudiant`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEtudiant {
    pub nom: String,
    pub prenom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub niveau: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etablissement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_path: Option<String>,
}

impl NewEtudiant {
    pub fn new(nom: impl Into<String>, prenom: impl Into<String>) -> Self {
        Self {
            nom: nom.into(),
            prenom: prenom.into(),
            email: None,
            niveau: None,
            etablissement: None,
            document_path: None,
        }
    }

    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.nom.trim().is_empty() {
            return Some("nom cannot be empty".to_string());
        }
        if self.prenom.trim().is_empty() {
            return Some("prenom cannot be empty".to_string());
        }
        None
    }
}

/// Body of `login` and `registerUser`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.email.trim().is_empty() {
            return Some("email cannot be empty".to_string());
        }
        if self.password.is_empty() {
            return Some("password cannot be empty".to_string());
        }
        None
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
