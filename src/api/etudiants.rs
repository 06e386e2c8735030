//! Student Endpoints
//!
//! Paginated list, single record and creation.
//!
//! # Endpoints
//! - `getAllEtudiants` - `GET /api/etudiants?page&limit&search`, provides `etudiants`
//! - `getEtudiant` - `GET /api/etudiants/{id}`, provides `etudiants` and `etudiant:<id>`
//! - `addEtudiant` - `POST /api/etudiants`, invalidates `etudiants`

use serde_json::Value;

use crate::cache::{CacheStore, EntryWatch, Subscription};
use crate::endpoint::{render_path, EndpointDescriptor, RequestSpec, Tag, TagSet};
use crate::error::{CacheError, Result};
use crate::models::{EtudiantListParams, NewEtudiant};

pub const GET_ALL_ETUDIANTS: &str = "getAllEtudiants";
pub const GET_ETUDIANT: &str = "getEtudiant";
pub const ADD_ETUDIANT: &str = "addEtudiant";

const ETUDIANTS_PATH: &str = "/api/etudiants";
const ETUDIANT_PATH: &str = "/api/etudiants/{id}";

/// Descriptors for every student endpoint.
pub fn endpoints() -> Vec<EndpointDescriptor> {
    vec![
        EndpointDescriptor::query(GET_ALL_ETUDIANTS, build_list).provides(provides_list),
        EndpointDescriptor::query(GET_ETUDIANT, build_one).provides(provides_one),
        EndpointDescriptor::mutation(ADD_ETUDIANT, build_add).invalidates(invalidates_list),
    ]
}

// == Request Builders ==
fn build_list(args: &Value) -> std::result::Result<RequestSpec, String> {
    let params: EtudiantListParams = match args {
        Value::Null => EtudiantListParams::default(),
        other => serde_json::from_value(other.clone()).map_err(|e| e.to_string())?,
    };
    if let Some(reason) = params.validate() {
        return Err(reason);
    }
    Ok(RequestSpec::get(ETUDIANTS_PATH)
        .with_query("page", params.page)
        .with_query("limit", params.limit)
        .with_query("search", params.search))
}

fn build_one(args: &Value) -> std::result::Result<RequestSpec, String> {
    render_path(ETUDIANT_PATH, args)
        .map(RequestSpec::get)
        .map_err(|name| format!("missing `{}`", name))
}

fn build_add(args: &Value) -> std::result::Result<RequestSpec, String> {
    if !args.is_object() {
        return Err("body must be a JSON object".to_string());
    }
    Ok(RequestSpec::post(ETUDIANTS_PATH, args.clone()))
}

// == Tags ==
fn provides_list(_result: &Value, _args: &Value) -> TagSet {
    [Tag::Etudiants].into_iter().collect()
}

fn provides_one(_result: &Value, args: &Value) -> TagSet {
    let mut tags: TagSet = [Tag::Etudiants].into_iter().collect();
    if let Some(id) = id_of(args) {
        tags.insert(Tag::Etudiant(id));
    }
    tags
}

fn invalidates_list(_args: &Value) -> TagSet {
    [Tag::Etudiants].into_iter().collect()
}

fn id_of(args: &Value) -> Option<String> {
    let id = match args {
        Value::Object(map) => map.get("id")?,
        scalar => scalar,
    };
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

// == Typed Helpers ==
/// Subscribes to one page of the student list.
pub fn subscribe_page(
    store: &CacheStore,
    params: &EtudiantListParams,
) -> Result<(Subscription, EntryWatch)> {
    store.subscribe(GET_ALL_ETUDIANTS, to_args(GET_ALL_ETUDIANTS, params)?)
}

/// Subscribes to one student record.
pub fn subscribe_one(store: &CacheStore, id: impl Into<Value>) -> Result<(Subscription, EntryWatch)> {
    store.subscribe(GET_ETUDIANT, id.into())
}

/// Creates a student; every cached list refreshes afterwards.
pub async fn add(store: &CacheStore, etudiant: &NewEtudiant) -> Result<Value> {
    if let Some(reason) = etudiant.validate() {
        return Err(CacheError::InvalidArguments {
            endpoint: ADD_ETUDIANT.to_string(),
            reason,
        });
    }
    store.mutate(ADD_ETUDIANT, to_args(ADD_ETUDIANT, etudiant)?).await
}

pub(crate) fn to_args<T: serde::Serialize>(endpoint: &str, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| CacheError::InvalidArguments {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}
