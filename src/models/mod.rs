//! Request and Response models for the student API
//!
//! This module defines the DTOs (Data Transfer Objects) sent as endpoint
//! arguments and decoded from cached response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{Credentials, EtudiantListParams, NewEtudiant};
pub use responses::{Etudiant, EtudiantId, EtudiantPage, LoginResponse};
