//! Response DTOs for the student API
//!
//! Typed views over the JSON bodies held in cache entries.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Student identifier; backends hand out numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EtudiantId {
    Number(u64),
    Text(String),
}

impl fmt::Display for EtudiantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtudiantId::Number(n) => write!(f, "{}", n),
            EtudiantId::Text(s) => f.write_str(s),
        }
    }
}

/// One student record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Etudiant {
    pub id: EtudiantId,
    pub nom: String,
    pub prenom: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub niveau: Option<String>,
    #[serde(default)]
    pub etablissement: Option<String>,
    #[serde(default)]
    pub document_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Etudiant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom)
    }
}

fn default_total_pages() -> u32 {
    1
}

/// Body of `getAllEtudiants`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtudiantPage {
    #[serde(default)]
    pub data: Vec<Etudiant>,
    #[serde(default = "default_total_pages")]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Body of `login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_deserialize() {
        let body = json!({
            "data": [{
                "id": 7,
                "nom": "Alaoui",
                "prenom": "Sara",
                "niveau": "L3",
                "createdAt": "2024-09-01T08:00:00Z"
            }],
            "totalPages": 4
        });
        let page: EtudiantPage = serde_json::from_value(body).unwrap();
        assert_eq!(page.total_pages, 4);
        assert_eq!(page.data[0].id, EtudiantId::Number(7));
        assert_eq!(page.data[0].full_name(), "Alaoui Sara");
        assert!(page.data[0].created_at.is_some());
        assert!(page.data[0].email.is_none());
    }

    #[test]
    fn test_page_defaults() {
        let page: EtudiantPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_string_id() {
        let etudiant: Etudiant =
            serde_json::from_value(json!({"id": "66f1a", "nom": "B", "prenom": "C"})).unwrap();
        assert_eq!(etudiant.id.to_string(), "66f1a");
    }

    #[test]
    fn test_login_response() {
        let response: LoginResponse = serde_json::from_value(json!({"token": "jwt"})).unwrap();
        assert_eq!(response.token, "jwt");
    }
}
