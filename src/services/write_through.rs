//! Write-through of mutation results into the query cache.
//!
//! After a mutation succeeds, the entity returned by the server is written
//! into every cache entry that could hold a copy of it: the single-entity
//! entry keyed by its id, and every list entry whose selector matches its
//! owner. This is a pure transform over the cache map, so it can be unit
//! tested without a runtime or a network.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::domain::errors::DomainResult;
use crate::domain::models::{CacheEntry, Entity, ListMissPolicy, ListResource, QueryData, QueryKey};

/// The full set of entries held by a cache for one entity type.
pub type CacheState<E> = HashMap<QueryKey, CacheEntry<E>>;

/// Which entries a write-through touched, grouped by effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteThroughReport {
    /// Single-entity entries overwritten with the entity.
    pub singles: Vec<QueryKey>,
    /// List entries where the entity replaced its previous copy in place.
    pub patched_lists: Vec<QueryKey>,
    /// List entries replaced by a one-item list.
    pub fabricated_lists: Vec<QueryKey>,
    /// List entries marked stale instead of fabricated.
    pub invalidated_lists: Vec<QueryKey>,
}

impl WriteThroughReport {
    /// Keys whose data changed.
    pub fn updated_keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.singles
            .iter()
            .chain(&self.patched_lists)
            .chain(&self.fabricated_lists)
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty()
            && self.patched_lists.is_empty()
            && self.fabricated_lists.is_empty()
            && self.invalidated_lists.is_empty()
    }

    fn sort(&mut self) {
        self.singles.sort();
        self.patched_lists.sort();
        self.fabricated_lists.sort();
        self.invalidated_lists.sort();
    }
}

/// Write `entity` into every entry of `state` that logically contains it.
///
/// - Entries matching `(kind, {id})` are overwritten with the entity.
/// - Entries matching the entity's list selector that already hold an item
///   with the same id get that item replaced in place; order and pagination
///   are kept.
/// - Matching list entries without the item (or still pending) follow
///   `policy`. With [`ListMissPolicy::Fabricate`] such a list is replaced by
///   a one-item list even when it was populated, so its items and pagination
///   are discarded rather than recomputed.
/// - No entry is ever created.
///
/// Applying the same entity twice leaves the state as applying it once.
pub fn apply_mutation_result<E: Entity>(
    state: &mut CacheState<E>,
    entity: &E,
    policy: ListMissPolicy,
    now: DateTime<Utc>,
) -> WriteThroughReport {
    let single_filter = entity.single_key();
    let list_filter = entity.list_filter();
    let mut report = WriteThroughReport::default();

    for (key, entry) in state.iter_mut() {
        if key.matches(&single_filter) {
            if matches!(entry.data, Some(QueryData::List(_))) {
                continue;
            }
            entry.replace(QueryData::Single(entity.clone()), now);
            report.singles.push(key.clone());
            continue;
        }

        if !key.matches(&list_filter) {
            continue;
        }

        let position = match &entry.data {
            Some(QueryData::Single(_)) => continue,
            Some(QueryData::List(list)) => {
                list.items.iter().position(|item| item.id() == entity.id())
            }
            None => None,
        };

        match (position, policy) {
            (Some(index), _) => {
                if let Some(QueryData::List(list)) = entry.data.as_mut() {
                    list.items[index] = entity.clone();
                }
                entry.updated_at = now;
                entry.invalidated = false;
                report.patched_lists.push(key.clone());
            }
            (None, ListMissPolicy::Fabricate) => {
                entry.replace(QueryData::List(ListResource::of_one(entity.clone())), now);
                report.fabricated_lists.push(key.clone());
            }
            (None, ListMissPolicy::Invalidate) => {
                entry.invalidated = true;
                report.invalidated_lists.push(key.clone());
            }
        }
    }

    report.sort();
    report
}

/// `(previous state, mutation result) -> next state`.
///
/// A failed mutation yields a state equal to `previous`.
pub fn write_through<E: Entity>(
    previous: &CacheState<E>,
    result: &DomainResult<E>,
    policy: ListMissPolicy,
    now: DateTime<Utc>,
) -> CacheState<E> {
    let mut next = previous.clone();
    if let Ok(entity) = result {
        apply_mutation_result(&mut next, entity, policy, now);
    }
    next
}
