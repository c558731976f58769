//! Query keys identify cached reads.
//!
//! A key is a resource kind plus an ordered map of selector parameters.
//! Keys compare structurally, so two reads built from the same parameters
//! always land on the same cache entry.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Selector parameter naming a single entity.
pub const ID_PARAM: &str = "id";

/// Selector parameter naming the owning organization of a list.
pub const ORGANIZATION_PARAM: &str = "organizationId";

/// Selector parameter naming the order a refund list belongs to.
pub const ORDER_PARAM: &str = "orderId";

/// The remote resource a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Subscriptions,
    Orders,
    Products,
    Refunds,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscriptions => write!(f, "subscriptions"),
            Self::Orders => write!(f, "orders"),
            Self::Products => write!(f, "products"),
            Self::Refunds => write!(f, "refunds"),
        }
    }
}

/// A single selector value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => write!(f, "[{}]", items.join(",")),
        }
    }
}

/// Ordered selector parameters of a query key.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, ParamValue>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Insert only when the value is present.
    #[must_use]
    pub fn with_opt<V: Into<ParamValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    /// Every parameter in `self` is present in `other` with an equal value.
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.0
            .iter()
            .all(|(name, value)| other.0.get(name) == Some(value))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

/// Composite identifier of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub params: QueryParams,
}

impl QueryKey {
    pub const fn new(kind: ResourceKind, params: QueryParams) -> Self {
        Self { kind, params }
    }

    /// Key for a single entity lookup: `(kind, {id})`.
    pub fn single(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::new(kind, QueryParams::new().with(ID_PARAM, id.into()))
    }

    /// Key for an organization-scoped list: `(kind, {organizationId})`.
    pub fn list(kind: ResourceKind, organization_id: impl Into<String>) -> Self {
        Self::new(
            kind,
            QueryParams::new().with(ORGANIZATION_PARAM, organization_id.into()),
        )
    }

    /// Add a filter parameter to the key.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params = self.params.with(name, value);
        self
    }

    /// Partial match used by filter operations.
    ///
    /// `self` is a stored key, `filter` the key being searched for. The
    /// kinds must be equal and every filter parameter must appear in `self`
    /// with the same value. Extra parameters on `self` are ignored.
    pub fn matches(&self, filter: &Self) -> bool {
        self.kind == filter.kind && filter.params.is_subset_of(&self.params)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.kind, self.params)
    }
}
