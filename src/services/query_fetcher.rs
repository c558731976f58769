//! Read-through fetching.
//!
//! A fresh cache entry is served as-is. Missing, pending, stale or
//! invalidated entries are fetched (with the retry policy) and stored.
//! A failed fetch leaves previously cached data untouched and drops the
//! placeholder of a key that never loaded.

use std::future::Future;

use crate::adapters::cache::QueryCache;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Entity, ListResource, QueryData, QueryKey};
use crate::services::retry::RetryPolicy;

#[derive(Debug, Clone, Default)]
pub struct QueryFetcher {
    retry: RetryPolicy,
}

impl QueryFetcher {
    pub const fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Serve `key` from `cache`, fetching with `fetch` when needed.
    pub async fn fetch<E, F, Fut>(
        &self,
        cache: &QueryCache<E>,
        key: &QueryKey,
        fetch: F,
    ) -> DomainResult<QueryData<E>>
    where
        E: Entity,
        F: Fn() -> Fut,
        Fut: Future<Output = DomainResult<QueryData<E>>>,
    {
        if let Some(entry) = cache.get(key).await {
            if !cache.is_stale(&entry) {
                if let Some(data) = entry.data {
                    tracing::debug!(key = %key, "query cache hit");
                    return Ok(data);
                }
            }
        }

        tracing::debug!(key = %key, "query cache miss, fetching");
        cache.ensure(key).await;
        let label = key.to_string();
        let data = match self.retry.execute(&label, fetch).await {
            Ok(data) => data,
            Err(err) => {
                cache.discard_pending(key).await;
                return Err(err);
            }
        };
        cache.set(key.clone(), data.clone()).await;
        Ok(data)
    }
}

pub(crate) fn expect_single<E: Entity>(data: QueryData<E>, key: &QueryKey) -> DomainResult<E> {
    data.into_single()
        .ok_or_else(|| DomainError::Decode(format!("expected a single entity under {key}")))
}

pub(crate) fn expect_list<E: Entity>(
    data: QueryData<E>,
    key: &QueryKey,
) -> DomainResult<ListResource<E>> {
    data.into_list()
        .ok_or_else(|| DomainError::Decode(format!("expected a list under {key}")))
}
