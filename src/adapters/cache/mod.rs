//! In-memory query cache with write-through of mutation results.
//!
//! Entries are keyed by [`QueryKey`](crate::domain::models::QueryKey) and
//! shared between every clone of the handle.

pub mod query_cache;

pub use query_cache::{CacheEvent, CacheSettings, QueryCache, SetData};
