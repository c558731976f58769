//! Keyed read-through cache for one entity type.
//!
//! Entries live behind a single `RwLock`. Every multi-entry write, including
//! the mutation write-through, happens inside one write-guard scope and
//! change events go out only after the guard is released, so subscribers
//! and concurrent readers never see a half-applied update.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};

use crate::domain::models::{CacheConfig, CacheEntry, Entity, ListMissPolicy, QueryData, QueryKey};
use crate::services::write_through::{self, CacheState, WriteThroughReport};

/// Change notification published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// New data was stored under the key.
    Updated(QueryKey),
    /// The entry was marked stale; the next read refetches it.
    Invalidated(QueryKey),
    /// The entry was dropped.
    Removed(QueryKey),
}

impl CacheEvent {
    pub const fn key(&self) -> &QueryKey {
        match self {
            Self::Updated(key) | Self::Invalidated(key) | Self::Removed(key) => key,
        }
    }
}

/// Replacement passed to [`QueryCache::set_many`].
pub enum SetData<E> {
    /// Store this value in every matching entry.
    Value(QueryData<E>),
    /// Compute the new value from the previous one. Returning `None` leaves
    /// the entry unchanged.
    Updater(Box<dyn Fn(Option<&QueryData<E>>) -> Option<QueryData<E>> + Send + Sync>),
}

impl<E> SetData<E> {
    pub fn updater<F>(f: F) -> Self
    where
        F: Fn(Option<&QueryData<E>>) -> Option<QueryData<E>> + Send + Sync + 'static,
    {
        Self::Updater(Box::new(f))
    }
}

/// Staleness and garbage-collection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub stale_time: chrono::Duration,
    pub gc_time: chrono::Duration,
    pub event_capacity: usize,
    pub list_miss_policy: ListMissPolicy,
}

impl CacheSettings {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            stale_time: millis(config.stale_time_ms),
            gc_time: millis(config.gc_time_ms),
            event_capacity: config.event_capacity.max(1),
            list_miss_policy: config.list_miss_policy,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

fn millis(ms: u64) -> chrono::Duration {
    chrono::Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

struct Inner<E> {
    entries: RwLock<CacheState<E>>,
    events: broadcast::Sender<CacheEvent>,
    settings: CacheSettings,
}

/// Cloneable handle to a shared cache.
///
/// Clones share the same entries, so a handle moved into a background task
/// keeps writing to the cache every other handle reads from.
pub struct QueryCache<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for QueryCache<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: Entity> QueryCache<E> {
    pub fn new(settings: CacheSettings) -> Self {
        let (events, _) = broadcast::channel(settings.event_capacity);
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(CacheState::new()),
                events,
                settings,
            }),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.inner.settings
    }

    /// Receive change events for every entry of this cache.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    pub async fn get(&self, key: &QueryKey) -> Option<CacheEntry<E>> {
        self.inner.entries.read().await.get(key).cloned()
    }

    pub async fn get_data(&self, key: &QueryKey) -> Option<QueryData<E>> {
        self.get(key).await.and_then(|entry| entry.data)
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.entries.read().await.is_empty()
    }

    /// Copy of every entry, for inspection and tests.
    pub async fn snapshot(&self) -> CacheState<E> {
        self.inner.entries.read().await.clone()
    }

    /// Whether a read of `entry` should go to the network.
    pub fn is_stale(&self, entry: &CacheEntry<E>) -> bool {
        self.is_stale_at(entry, Utc::now())
    }

    fn is_stale_at(&self, entry: &CacheEntry<E>, now: DateTime<Utc>) -> bool {
        entry.invalidated
            || entry.is_pending()
            || now - entry.updated_at >= self.inner.settings.stale_time
    }

    /// Create a pending entry for `key` if none exists.
    pub async fn ensure(&self, key: &QueryKey) {
        let mut entries = self.inner.entries.write().await;
        entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::pending(Utc::now()));
    }

    /// Store fetched data under `key`.
    pub async fn set(&self, key: QueryKey, data: QueryData<E>) {
        let now = Utc::now();
        {
            let mut entries = self.inner.entries.write().await;
            entries
                .entry(key.clone())
                .and_modify(|entry| entry.replace(data.clone(), now))
                .or_insert_with(|| CacheEntry::with_data(data, now));
        }
        tracing::trace!(key = %key, "cache entry updated");
        self.publish(vec![CacheEvent::Updated(key)]);
    }

    /// Update every entry matching `filter`. Returns the updated keys.
    pub async fn set_many(&self, filter: &QueryKey, update: SetData<E>) -> Vec<QueryKey> {
        let now = Utc::now();
        let mut updated = Vec::new();
        {
            let mut entries = self.inner.entries.write().await;
            for (key, entry) in entries.iter_mut().filter(|(key, _)| key.matches(filter)) {
                let next = match &update {
                    SetData::Value(data) => Some(data.clone()),
                    SetData::Updater(f) => f(entry.data.as_ref()),
                };
                if let Some(data) = next {
                    entry.replace(data, now);
                    updated.push(key.clone());
                }
            }
        }
        updated.sort();
        self.publish(updated.iter().cloned().map(CacheEvent::Updated).collect());
        updated
    }

    /// Mark every entry matching `filter` stale. Returns how many were marked.
    pub async fn invalidate(&self, filter: &QueryKey) -> usize {
        let mut invalidated = Vec::new();
        {
            let mut entries = self.inner.entries.write().await;
            for (key, entry) in entries.iter_mut().filter(|(key, _)| key.matches(filter)) {
                entry.invalidated = true;
                invalidated.push(key.clone());
            }
        }
        let count = invalidated.len();
        tracing::debug!(filter = %filter, count, "cache entries invalidated");
        self.publish(invalidated.into_iter().map(CacheEvent::Invalidated).collect());
        count
    }

    /// Drop the entry under `key` if it never received data.
    ///
    /// Called when the first fetch of a key fails, so the placeholder does
    /// not outlive the request that created it.
    pub async fn discard_pending(&self, key: &QueryKey) -> bool {
        let removed = {
            let mut entries = self.inner.entries.write().await;
            match entries.get(key) {
                Some(entry) if entry.is_pending() => entries.remove(key).is_some(),
                _ => false,
            }
        };
        if removed {
            tracing::debug!(key = %key, "pending cache entry discarded");
            self.publish(vec![CacheEvent::Removed(key.clone())]);
        }
        removed
    }

    /// Drop every entry matching `filter`. Returns how many were dropped.
    pub async fn remove(&self, filter: &QueryKey) -> usize {
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.entries.write().await;
            let keys: Vec<QueryKey> = entries
                .keys()
                .filter(|key| key.matches(filter))
                .cloned()
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };
        let count = removed.len();
        self.publish(removed.into_iter().map(CacheEvent::Removed).collect());
        count
    }

    pub async fn clear(&self) {
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.entries.write().await;
            entries.drain().map(|(key, _)| key).collect()
        };
        self.publish(removed.into_iter().map(CacheEvent::Removed).collect());
    }

    /// Drop entries whose last update is older than the gc time.
    ///
    /// Pending entries are kept; their fetch is still in flight, since a
    /// failed first fetch discards its placeholder.
    pub async fn collect_garbage(&self) -> usize {
        let now = Utc::now();
        let gc_time = self.inner.settings.gc_time;
        let removed: Vec<QueryKey> = {
            let mut entries = self.inner.entries.write().await;
            let expired: Vec<QueryKey> = entries
                .iter()
                .filter(|(_, entry)| !entry.is_pending() && now - entry.updated_at >= gc_time)
                .map(|(key, _)| key.clone())
                .collect();
            for key in &expired {
                entries.remove(key);
            }
            expired
        };
        let count = removed.len();
        if count > 0 {
            tracing::debug!(count, "garbage collected cache entries");
        }
        self.publish(removed.into_iter().map(CacheEvent::Removed).collect());
        count
    }

    /// Write a successful mutation result into every entry holding `entity`.
    ///
    /// Both the single-entity write and the list writes happen under one
    /// write lock.
    pub async fn apply_mutation_result(&self, entity: &E) -> WriteThroughReport {
        let report = {
            let mut entries = self.inner.entries.write().await;
            write_through::apply_mutation_result(
                &mut entries,
                entity,
                self.inner.settings.list_miss_policy,
                Utc::now(),
            )
        };

        tracing::debug!(
            kind = %E::KIND,
            id = entity.id(),
            singles = report.singles.len(),
            patched = report.patched_lists.len(),
            fabricated = report.fabricated_lists.len(),
            invalidated = report.invalidated_lists.len(),
            "mutation written through cache"
        );

        let mut events: Vec<CacheEvent> = report.updated_keys().cloned().map(CacheEvent::Updated).collect();
        events.extend(report.invalidated_lists.iter().cloned().map(CacheEvent::Invalidated));
        self.publish(events);
        report
    }

    fn publish(&self, events: Vec<CacheEvent>) {
        for event in events {
            // No receivers is fine.
            let _ = self.inner.events.send(event);
        }
    }
}
