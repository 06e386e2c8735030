//! Mock Transport
//!
//! In-memory transport answering from scripted routes, for tests and
//! offline runs of the cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::endpoint::RequestSpec;
use crate::error::TransportError;
use crate::transport::{Transport, TransportResponse};

type Scripted = std::result::Result<TransportResponse, TransportError>;

/// Answers by request path. Unknown paths get a 404.
///
/// A gated transport parks every call until `release` hands out a permit,
/// which keeps requests in flight for as long as a test needs.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<Vec<RequestSpec>>,
    gate: Option<Semaphore>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    pub fn respond_json(&self, path: &str, body: Value) {
        self.routes
            .lock()
            .insert(path.to_string(), Ok(TransportResponse::ok_json(&body)));
    }

    pub fn respond(&self, path: &str, response: TransportResponse) {
        self.routes.lock().insert(path.to_string(), Ok(response));
    }

    pub fn fail(&self, path: &str, err: TransportError) {
        self.routes.lock().insert(path.to_string(), Err(err));
    }

    /// Lets one parked call proceed.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> Vec<RequestSpec> {
        self.calls.lock().clone()
    }

    /// Number of calls made to `path`, whatever the method.
    pub fn calls_to(&self, path: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.path == path).count()
    }

    /// Polls until at least `n` calls have been made.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().len() < n {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &RequestSpec) -> Scripted {
        self.calls.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| TransportError::Network(e.to_string()))?;
            permit.forget();
        }

        self.routes
            .lock()
            .get(&request.path)
            .cloned()
            .unwrap_or_else(|| Ok(TransportResponse::new(404, r#"{"message":"Not Found"}"#)))
    }
}
