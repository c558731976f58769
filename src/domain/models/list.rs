//! Paginated list wrapper returned by collection endpoints.

use serde::{Deserialize, Serialize};

/// Pagination block of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_count: u64,
    pub max_page: u64,
}

impl Pagination {
    /// Pagination describing a list of exactly one item.
    pub const fn single_page_of_one() -> Self {
        Self {
            total_count: 1,
            max_page: 1,
        }
    }
}

/// `{items, pagination}` list resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResource<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> ListResource<T> {
    pub const fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self { items, pagination }
    }

    /// A list holding a single item with `{total_count: 1, max_page: 1}`.
    pub fn of_one(item: T) -> Self {
        Self {
            items: vec![item],
            pagination: Pagination::single_page_of_one(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
