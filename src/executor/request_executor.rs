//! Request Executor Module
//!
//! Runs each distinct in-flight key through the transport exactly once and
//! fans the outcome out to every waiter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::cache::CacheKey;
use crate::endpoint::RequestSpec;
use crate::error::{RequestError, TransportError};
use crate::executor::PrepareHeaders;
use crate::transport::{Transport, TransportResponse};

/// Outcome delivered to every waiter of a call.
pub type Outcome = std::result::Result<Value, RequestError>;

type Waiters = Vec<oneshot::Sender<Outcome>>;

// == Request Executor ==
/// Deduplicating front of the transport. Cheap to clone.
#[derive(Clone)]
pub struct RequestExecutor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    transport: Arc<dyn Transport>,
    hook: Option<Arc<dyn PrepareHeaders>>,
    in_flight: Mutex<HashMap<CacheKey, Waiters>>,
    transport_calls: AtomicU64,
    joined: AtomicU64,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::build(transport, None)
    }

    /// Executor applying `hook` to every physical call.
    pub fn with_hook(transport: Arc<dyn Transport>, hook: Arc<dyn PrepareHeaders>) -> Self {
        Self::build(transport, Some(hook))
    }

    fn build(transport: Arc<dyn Transport>, hook: Option<Arc<dyn PrepareHeaders>>) -> Self {
        Self {
            inner: Arc::new(ExecutorInner {
                transport,
                hook,
                in_flight: Mutex::new(HashMap::new()),
                transport_calls: AtomicU64::new(0),
                joined: AtomicU64::new(0),
            }),
        }
    }

    // == Execute ==
    /// Resolves `request` for `key`.
    ///
    /// If a call for `key` is already in flight the caller joins it instead of
    /// issuing a second transport call. The call itself runs on its own task,
    /// so dropping any waiter (including the first) never cancels it.
    pub async fn execute(&self, key: CacheKey, request: RequestSpec) -> Outcome {
        let (tx, rx) = oneshot::channel();

        let is_leader = {
            let mut in_flight = self.inner.in_flight.lock();
            match in_flight.get_mut(&key) {
                Some(waiters) => {
                    waiters.push(tx);
                    false
                }
                None => {
                    in_flight.insert(key.clone(), vec![tx]);
                    true
                }
            }
        };

        if is_leader {
            tokio::spawn(perform(Arc::clone(&self.inner), key, request));
        } else {
            self.inner.joined.fetch_add(1, Ordering::Relaxed);
            debug!(key = %key, "Joined in-flight request");
        }

        rx.await.unwrap_or_else(|_| {
            Err(RequestError::Transport(TransportError::Network(
                "request abandoned before completion".to_string(),
            )))
        })
    }

    /// True while a call for `key` has not delivered its outcome.
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.inner.in_flight.lock().contains_key(key)
    }

    /// Number of physical transport calls issued so far.
    pub fn transport_calls(&self) -> u64 {
        self.inner.transport_calls.load(Ordering::Relaxed)
    }

    /// Number of callers that joined an existing call.
    pub fn joined(&self) -> u64 {
        self.inner.joined.load(Ordering::Relaxed)
    }
}

// == Flight Guard ==
/// Owns the waiter list of one key for the duration of a physical call.
/// If the call task dies before completing, dropping the guard releases the
/// waiters (they observe an abandoned request) and frees the key.
struct FlightGuard {
    inner: Arc<ExecutorInner>,
    key: Option<CacheKey>,
}

impl FlightGuard {
    fn complete(mut self, outcome: Outcome) {
        let Some(key) = self.key.take() else {
            return;
        };
        let waiters = self.inner.in_flight.lock().remove(&key).unwrap_or_default();
        debug!(key = %key, waiters = waiters.len(), ok = outcome.is_ok(), "Request completed");
        for waiter in waiters {
            // receiver gone means the waiter stopped caring
            let _ = waiter.send(outcome.clone());
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            warn!(key = %key, "Request task ended without an outcome");
            self.inner.in_flight.lock().remove(&key);
        }
    }
}

async fn perform(inner: Arc<ExecutorInner>, key: CacheKey, mut request: RequestSpec) {
    let guard = FlightGuard {
        inner: Arc::clone(&inner),
        key: Some(key),
    };

    if let Some(hook) = &inner.hook {
        hook.prepare(&mut request.headers);
    }
    inner.transport_calls.fetch_add(1, Ordering::Relaxed);

    let outcome = match inner.transport.send(&request).await {
        Ok(response) => decode(response),
        Err(err) => Err(RequestError::Transport(err)),
    };
    guard.complete(outcome);
}

// == Decode ==
/// Turns a raw response into an outcome. An empty success body decodes to
/// `null`; a non-JSON error body is kept as a string.
fn decode(response: TransportResponse) -> Outcome {
    if !response.is_success() {
        let body = serde_json::from_str(&response.body)
            .unwrap_or_else(|_| Value::String(response.body.clone()));
        return Err(RequestError::Status {
            status: response.status,
            body,
        });
    }

    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }

    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(value),
        Err(err) => Err(RequestError::Decode {
            detail: err.to_string(),
            body: response.body,
        }),
    }
}
