//! The contract a remote resource needs to live in the query cache.

use std::fmt::Debug;

use super::query_key::{QueryKey, QueryParams, ResourceKind, ORGANIZATION_PARAM};

/// A remote resource identified by a stable id.
pub trait Entity: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Resource kind used as the first component of every query key.
    const KIND: ResourceKind;

    /// Stable identifier.
    fn id(&self) -> &str;

    /// Organization that owns this entity.
    fn owner_id(&self) -> &str;

    /// Selector matching the list entries this entity belongs to.
    ///
    /// Only the owner reference is used; additional filters on a cached
    /// list key are not evaluated against the entity.
    fn list_selector(&self) -> QueryParams {
        QueryParams::new().with(ORGANIZATION_PARAM, self.owner_id())
    }

    /// Key of the single-entity entry for this entity.
    fn single_key(&self) -> QueryKey {
        QueryKey::single(Self::KIND, self.id())
    }

    /// Filter key for the list entries containing this entity.
    fn list_filter(&self) -> QueryKey {
        QueryKey::new(Self::KIND, self.list_selector())
    }
}
