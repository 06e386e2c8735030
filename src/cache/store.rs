//! Cache Store Module
//!
//! Owns every cache entry: subscriber bookkeeping, fetch scheduling, tag
//! invalidation and eviction of unused entries.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheKey, CacheStats, EntryWatch, SubscriberId, Subscription};
use crate::endpoint::{
    intersects, EndpointDescriptor, EndpointKind, EndpointRegistry, RequestSpec, TagSet,
};
use crate::error::{CacheError, RequestError, Result, TransportError};
use crate::executor::{Outcome, RequestExecutor};
use crate::invalidation::InvalidationCoordinator;

// == Store Config ==
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long an entry with zero subscribers is kept before eviction
    pub eviction_grace: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            eviction_grace: Duration::from_secs(60),
        }
    }
}

// == Cache Store ==
/// Request cache shared by every consumer of one session. Cheap to clone.
///
/// All bookkeeping happens under one lock that is never held across an
/// await point, so subscribe, unsubscribe, completion and invalidation
/// events apply atomically with respect to each other.
#[derive(Clone)]
pub struct CacheStore {
    inner: Arc<StoreInner>,
}

pub(crate) struct StoreInner {
    registry: Arc<EndpointRegistry>,
    executor: RequestExecutor,
    config: StoreConfig,
    state: Mutex<StoreState>,
    next_id: AtomicU64,
}

#[derive(Default)]
struct StoreState {
    slots: HashMap<CacheKey, Slot>,
    stats: CacheStats,
}

/// Entry plus what the store needs to refetch and notify it.
struct Slot {
    entry: CacheEntry,
    endpoint: Arc<EndpointDescriptor>,
    args: Value,
    request: RequestSpec,
    subscribers: HashSet<SubscriberId>,
    idle_since: Option<Instant>,
    tx: watch::Sender<CacheEntry>,
}

impl Slot {
    fn new(key: CacheKey, endpoint: Arc<EndpointDescriptor>, args: Value, request: RequestSpec) -> Self {
        let entry = CacheEntry::new(key);
        let (tx, _) = watch::channel(entry.clone());
        Self {
            entry,
            endpoint,
            args,
            request,
            subscribers: HashSet::new(),
            idle_since: None,
            tx,
        }
    }

    fn publish(&self) {
        self.tx.send_replace(self.entry.clone());
    }

    fn is_evictable(&self, now: Instant, grace: Duration) -> bool {
        self.subscribers.is_empty()
            && self.entry.in_flight_request_id.is_none()
            && self
                .idle_since
                .map_or(false, |since| now.saturating_duration_since(since) >= grace)
    }
}

/// A fetch that has been recorded on its entry and still has to be spawned.
struct FetchTicket {
    key: CacheKey,
    request_id: u64,
    request: RequestSpec,
}

/// Owned by the task running one fetch. If the task panics or is dropped
/// before the outcome is applied, the entry is moved to `Error` instead of
/// staying in `Loading`.
struct FetchGuard {
    inner: Arc<StoreInner>,
    key: CacheKey,
    request_id: u64,
    done: bool,
}

impl FetchGuard {
    fn complete(mut self, runtime: &Handle, outcome: Outcome) {
        self.inner
            .complete_fetch(runtime, &self.key, self.request_id, outcome);
        self.done = true;
    }
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        if !self.done {
            self.inner.abandon_fetch(&self.key, self.request_id);
        }
    }
}

impl CacheStore {
    // == Constructor ==
    pub fn new(registry: Arc<EndpointRegistry>, executor: RequestExecutor, config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                registry,
                executor,
                config,
                state: Mutex::new(StoreState::default()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.inner.registry
    }

    // == Subscribe ==
    /// Registers interest in `endpoint(args)` and returns a live view.
    ///
    /// Creates the entry on first use and starts a fetch when the entry has
    /// never loaded, last failed, or was invalidated while unobserved. An
    /// entry past its eviction grace period is dropped first, so it is
    /// always fetched afresh.
    ///
    /// Fails with `NoRuntime` outside a tokio runtime, before the entry is
    /// touched.
    pub fn subscribe(&self, endpoint: &str, args: Value) -> Result<(Subscription, EntryWatch)> {
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;
        let descriptor = self.inner.registry.resolve(endpoint)?;
        descriptor.expect_kind(EndpointKind::Query)?;
        let request = descriptor.build_request(&args)?;
        let key = CacheKey::new(descriptor.name(), &args);

        let id = SubscriberId(self.inner.next_id());
        let active = Arc::new(AtomicBool::new(true));

        let (rx, ticket) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;

            let expired = state
                .slots
                .get(&key)
                .map_or(false, |slot| slot.is_evictable(Instant::now(), self.inner.config.eviction_grace));
            if expired {
                state.slots.remove(&key);
                state.stats.record_evictions(1);
                debug!(key = %key, "Evicted expired entry on subscribe");
            }

            let slot = state
                .slots
                .entry(key.clone())
                .or_insert_with(|| Slot::new(key.clone(), descriptor, args, request));
            slot.subscribers.insert(id);
            slot.idle_since = None;
            slot.entry.subscriber_count = slot.subscribers.len();

            let ticket = if slot.entry.needs_fetch() {
                state.stats.record_miss();
                Some(self.inner.begin_fetch(slot))
            } else if slot.entry.in_flight_request_id.is_some() {
                state.stats.record_deduplicated();
                None
            } else {
                state.stats.record_hit();
                None
            };
            slot.publish();
            let rx = slot.tx.subscribe();

            state.stats.set_total_entries(state.slots.len());
            (rx, ticket)
        };

        if let Some(ticket) = ticket {
            self.inner.spawn_fetch(&runtime, ticket);
        }

        debug!(key = %key, subscriber = id.0, "Subscribed");
        let subscription = Subscription::new(key, id, Arc::clone(&active), Arc::downgrade(&self.inner));
        Ok((subscription, EntryWatch::new(rx, active)))
    }

    // == Unsubscribe ==
    /// Drops a subscriber. Idempotent; never cancels an in-flight fetch.
    pub fn unsubscribe(&self, subscription: &Subscription) {
        subscription.unsubscribe();
    }

    // == Query ==
    /// Subscribes, waits for the entry to settle, then unsubscribes.
    ///
    /// The entry stays cached for the eviction grace period.
    pub async fn query(&self, endpoint: &str, args: Value) -> Result<Value> {
        let (subscription, mut watch) = self.subscribe(endpoint, args)?;
        let settled = watch.settled().await;
        subscription.unsubscribe();

        let entry = settled.ok_or_else(|| {
            CacheError::Request(RequestError::Transport(TransportError::Network(
                "subscription closed before the request settled".to_string(),
            )))
        })?;
        match (entry.error, entry.data) {
            (Some(err), _) => Err(CacheError::Request(err)),
            (None, Some(data)) => Ok(data),
            (None, None) => Ok(Value::Null),
        }
    }

    // == Mutate ==
    /// Runs a mutation and, on success, invalidates the tags it declares
    /// before returning the response body.
    pub async fn mutate(&self, endpoint: &str, args: Value) -> Result<Value> {
        let descriptor = self.inner.registry.resolve(endpoint)?;
        descriptor.expect_kind(EndpointKind::Mutation)?;
        let request = descriptor.build_request(&args)?;
        let key = CacheKey::unique(descriptor.name(), self.inner.next_id());

        info!(endpoint = descriptor.name(), "Running mutation");
        let result = self.inner.executor.execute(key, request).await.map_err(|err| {
            warn!(endpoint = descriptor.name(), code = err.code(), error = %err, "Mutation failed");
            CacheError::Request(err)
        })?;

        InvalidationCoordinator::new(self).on_mutation_success(&descriptor, &args, &result);
        Ok(result)
    }

    // == Refetch ==
    /// Forces a fetch for the subscription's entry, unless one is already
    /// running. Returns whether a fetch was started.
    pub fn refetch(&self, subscription: &Subscription) -> bool {
        if !subscription.is_active() {
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(key = %subscription.key(), "Refetch requested outside a runtime");
            return false;
        };
        let ticket = {
            let mut state = self.inner.state.lock();
            match state.slots.get_mut(subscription.key()) {
                Some(slot) if slot.entry.in_flight_request_id.is_none() => {
                    let ticket = self.inner.begin_fetch(slot);
                    slot.publish();
                    Some(ticket)
                }
                _ => None,
            }
        };
        match ticket {
            Some(ticket) => {
                self.inner.spawn_fetch(&runtime, ticket);
                true
            }
            None => false,
        }
    }

    // == Invalidate Tags ==
    /// Marks every entry providing any of `tags` stale. Subscribed entries
    /// move to `Loading` and refetch; an entry whose fetch is already running
    /// refetches once it completes. Unsubscribed entries only become stale and
    /// reload on their next subscription.
    ///
    /// Outside a tokio runtime every hit entry is only marked stale.
    ///
    /// Returns the number of entries hit.
    pub fn invalidate_tags(&self, tags: &TagSet) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let runtime = Handle::try_current().ok();

        let (affected, tickets) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            let mut affected = 0;
            let mut tickets = Vec::new();

            for slot in state.slots.values_mut() {
                if !intersects(&slot.entry.provided_tags, tags) {
                    continue;
                }
                affected += 1;
                slot.entry.stale = true;
                if runtime.is_some()
                    && !slot.subscribers.is_empty()
                    && slot.entry.in_flight_request_id.is_none()
                {
                    tickets.push(self.inner.begin_fetch(slot));
                }
                slot.publish();
            }
            state.stats.record_invalidations(affected);
            (affected, tickets)
        };

        info!(
            tags = ?tags,
            affected,
            refetching = tickets.len(),
            "Invalidated tags"
        );
        if let Some(runtime) = runtime {
            for ticket in tickets {
                self.inner.spawn_fetch(&runtime, ticket);
            }
        }
        affected
    }

    // == Peek ==
    /// Reads an entry without subscribing or fetching.
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner
            .state
            .lock()
            .slots
            .get(key)
            .map(|slot| slot.entry.clone())
    }

    // == Evict Idle ==
    /// Removes entries that have had no subscriber and no running fetch for
    /// at least the eviction grace period. Returns the number removed.
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let grace = self.inner.config.eviction_grace;

        let mut state = self.inner.state.lock();
        let before = state.slots.len();
        state.slots.retain(|_, slot| !slot.is_evictable(now, grace));
        let removed = before - state.slots.len();

        state.stats.record_evictions(removed);
        let total = state.slots.len();
        state.stats.set_total_entries(total);
        removed
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = {
            let state = self.inner.state.lock();
            let mut stats = state.stats.clone();
            stats.set_total_entries(state.slots.len());
            stats
        };
        stats.transport_calls = self.inner.executor.transport_calls();
        stats.deduplicated += self.inner.executor.joined();
        stats
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StoreInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    fn begin_fetch(&self, slot: &mut Slot) -> FetchTicket {
        let request_id = self.next_id();
        slot.entry.begin_fetch(request_id);
        debug!(key = %slot.entry.key, request_id, "Starting fetch");
        FetchTicket {
            key: slot.entry.key.clone(),
            request_id,
            request: slot.request.clone(),
        }
    }

    fn spawn_fetch(self: &Arc<Self>, runtime: &Handle, ticket: FetchTicket) {
        let FetchTicket {
            key,
            request_id,
            request,
        } = ticket;
        let guard = FetchGuard {
            inner: Arc::clone(self),
            key,
            request_id,
            done: false,
        };
        let task_runtime = runtime.clone();
        runtime.spawn(async move {
            let outcome = guard
                .inner
                .executor
                .execute(guard.key.clone(), request)
                .await;
            guard.complete(&task_runtime, outcome);
        });
    }

    /// Applies an outcome in completion order.
    fn complete_fetch(
        self: &Arc<Self>,
        runtime: &Handle,
        key: &CacheKey,
        request_id: u64,
        outcome: Outcome,
    ) {
        let ticket = {
            let mut state = self.state.lock();
            let Some(slot) = state.slots.get_mut(key) else {
                debug!(key = %key, "Entry gone before its fetch completed");
                return;
            };
            if slot.entry.in_flight_request_id != Some(request_id) {
                debug!(key = %key, request_id, "Ignoring outcome of superseded fetch");
                return;
            }

            match outcome {
                Ok(data) => {
                    let tags = slot.endpoint.provides_tags(&data, &slot.args);
                    slot.entry.apply_success(data, tags);
                    debug!(key = %key, "Fetch succeeded");
                }
                Err(err) => {
                    warn!(key = %key, code = err.code(), error = %err, "Fetch failed");
                    slot.entry.apply_error(err);
                }
            }

            let ticket = if slot.entry.stale && !slot.subscribers.is_empty() {
                Some(self.begin_fetch(slot))
            } else {
                None
            };
            slot.publish();
            ticket
        };

        if let Some(ticket) = ticket {
            self.spawn_fetch(runtime, ticket);
        }
    }

    /// Settles a fetch whose task ended without applying an outcome.
    fn abandon_fetch(&self, key: &CacheKey, request_id: u64) {
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.get_mut(key) {
            if slot.entry.in_flight_request_id == Some(request_id) {
                warn!(key = %key, request_id, "Fetch task ended without an outcome");
                slot.entry.apply_error(RequestError::Transport(TransportError::Network(
                    "fetch task ended without an outcome".to_string(),
                )));
                slot.publish();
            }
        }
    }

    /// Removes one subscriber; `active` makes repeated calls no-ops.
    pub(crate) fn release(&self, key: &CacheKey, id: SubscriberId, active: &AtomicBool) {
        if !active.swap(false, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.lock();
        if let Some(slot) = state.slots.get_mut(key) {
            if slot.subscribers.remove(&id) {
                slot.entry.subscriber_count = slot.subscribers.len();
                if slot.subscribers.is_empty() {
                    slot.idle_since = Some(Instant::now());
                }
                slot.publish();
                debug!(key = %key, subscriber = id.0, remaining = slot.subscribers.len(), "Unsubscribed");
            }
        }
    }
}
