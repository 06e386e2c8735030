//! Subscription Module
//!
//! Handles held by consumers of a cache entry and the live view they read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;

use crate::cache::store::StoreInner;
use crate::cache::{CacheEntry, CacheKey};

/// Identifier of one subscriber, unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub(crate) u64);

// == Subscription ==
/// Interest of one consumer in one cache entry.
///
/// Unsubscribing is idempotent. Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    key: CacheKey,
    id: SubscriberId,
    active: Arc<AtomicBool>,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub(crate) fn new(
        key: CacheKey,
        id: SubscriberId,
        active: Arc<AtomicBool>,
        store: Weak<StoreInner>,
    ) -> Self {
        Self {
            key,
            id,
            active,
            store,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Drops this subscriber's interest. Further calls do nothing.
    pub fn unsubscribe(&self) {
        if let Some(store) = self.store.upgrade() {
            store.release(&self.key, self.id, &self.active);
        } else {
            self.active.store(false, Ordering::SeqCst);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// == Entry Watch ==
/// Live view of a cache entry. Stops yielding once its subscription is gone.
#[derive(Debug)]
pub struct EntryWatch {
    rx: watch::Receiver<CacheEntry>,
    active: Arc<AtomicBool>,
}

impl EntryWatch {
    pub(crate) fn new(rx: watch::Receiver<CacheEntry>, active: Arc<AtomicBool>) -> Self {
        Self { rx, active }
    }

    /// Latest published snapshot.
    pub fn current(&self) -> CacheEntry {
        self.rx.borrow().clone()
    }

    /// Waits for the next transition.
    ///
    /// Returns `None` after unsubscribe, or if the entry was evicted.
    pub async fn changed(&mut self) -> Option<CacheEntry> {
        if !self.is_active() {
            return None;
        }
        self.rx.changed().await.ok()?;
        if !self.is_active() {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the entry satisfies `predicate`, checking the current
    /// snapshot first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<CacheEntry>
    where
        F: Fn(&CacheEntry) -> bool,
    {
        loop {
            if !self.is_active() {
                return None;
            }
            let snapshot = self.rx.borrow_and_update().clone();
            if predicate(&snapshot) {
                return Some(snapshot);
            }
            self.rx.changed().await.ok()?;
        }
    }

    /// Waits until no fetch is running and one has resolved.
    pub async fn settled(&mut self) -> Option<CacheEntry> {
        self.wait_for(CacheEntry::is_settled).await
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
