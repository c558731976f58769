//! Values stored in the query cache.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::list::ListResource;

/// Data held by a cache entry: one entity or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryData<E> {
    Single(E),
    List(ListResource<E>),
}

impl<E: Entity> QueryData<E> {
    pub fn as_single(&self) -> Option<&E> {
        match self {
            Self::Single(entity) => Some(entity),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListResource<E>> {
        match self {
            Self::List(list) => Some(list),
            Self::Single(_) => None,
        }
    }

    pub fn into_single(self) -> Option<E> {
        match self {
            Self::Single(entity) => Some(entity),
            Self::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<ListResource<E>> {
        match self {
            Self::List(list) => Some(list),
            Self::Single(_) => None,
        }
    }

    /// Whether this data holds a copy of the entity with `id`.
    pub fn contains(&self, id: &str) -> bool {
        match self {
            Self::Single(entity) => entity.id() == id,
            Self::List(list) => list.items.iter().any(|item| item.id() == id),
        }
    }
}

/// One cache slot.
///
/// `data` is `None` while the first fetch for the key is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<E> {
    pub data: Option<QueryData<E>>,
    pub updated_at: DateTime<Utc>,
    pub invalidated: bool,
}

impl<E> CacheEntry<E> {
    pub fn pending(now: DateTime<Utc>) -> Self {
        Self {
            data: None,
            updated_at: now,
            invalidated: false,
        }
    }

    pub const fn with_data(data: QueryData<E>, now: DateTime<Utc>) -> Self {
        Self {
            data: Some(data),
            updated_at: now,
            invalidated: false,
        }
    }

    pub const fn is_pending(&self) -> bool {
        self.data.is_none()
    }

    /// Store fresh data, clearing any invalidation mark.
    pub fn replace(&mut self, data: QueryData<E>, now: DateTime<Utc>) {
        self.data = Some(data);
        self.updated_at = now;
        self.invalidated = false;
    }
}
