//! Cache Entry Module
//!
//! Defines the state of one cached request and its lifecycle transitions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheKey;
use crate::endpoint::TagSet;
use crate::error::RequestError;

// == Entry Status ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Created, no request issued yet
    Idle,
    /// A request is in flight; previous `data` stays readable
    Loading,
    Success,
    Error,
}

// == Cache Entry ==
/// Snapshot of a cached request, as published to subscribers.
///
/// `data` survives failed and in-progress refetches, so an `Error` entry can
/// carry both the failure and the last good result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub status: EntryStatus,
    /// Body of the last successful fetch
    pub data: Option<Value>,
    /// Failure of the last fetch, cleared by the next success
    pub error: Option<RequestError>,
    /// Tags from the last successful fetch
    pub provided_tags: TagSet,
    pub subscriber_count: usize,
    /// Invalidated since the last fetch started
    pub stale: bool,
    pub last_fetched_at: Option<DateTime<Utc>>,
    pub in_flight_request_id: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an `Idle` entry with no data and no subscribers.
    pub fn new(key: CacheKey) -> Self {
        Self {
            key,
            status: EntryStatus::Idle,
            data: None,
            error: None,
            provided_tags: TagSet::new(),
            subscriber_count: 0,
            stale: false,
            last_fetched_at: None,
            in_flight_request_id: None,
        }
    }

    /// True once a fetch has resolved and none is running.
    pub fn is_settled(&self) -> bool {
        self.in_flight_request_id.is_none()
            && matches!(self.status, EntryStatus::Success | EntryStatus::Error)
    }

    /// True if a new subscriber should trigger a fetch.
    ///
    /// `Error` entries are refetched on subscribe; that is the only retry
    /// path, the store never retries by itself.
    pub fn needs_fetch(&self) -> bool {
        if self.in_flight_request_id.is_some() {
            return false;
        }
        match self.status {
            EntryStatus::Idle | EntryStatus::Error => true,
            EntryStatus::Success => self.stale,
            EntryStatus::Loading => false,
        }
    }

    // == Transitions ==
    pub(crate) fn begin_fetch(&mut self, request_id: u64) {
        self.status = EntryStatus::Loading;
        self.in_flight_request_id = Some(request_id);
        self.stale = false;
    }

    pub(crate) fn apply_success(&mut self, data: Value, tags: TagSet) {
        self.status = EntryStatus::Success;
        self.data = Some(data);
        self.error = None;
        self.provided_tags = tags;
        self.last_fetched_at = Some(Utc::now());
        self.in_flight_request_id = None;
    }

    pub(crate) fn apply_error(&mut self, error: RequestError) {
        self.status = EntryStatus::Error;
        self.error = Some(error);
        self.in_flight_request_id = None;
    }
}
