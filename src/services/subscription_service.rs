//! Subscription queries and the update mutation.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::adapters::cache::QueryCache;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Entity, ListResource, ListSubscriptionsParams, QueryData, QueryKey, ResourceKind,
    Subscription, SubscriptionUpdate, ORGANIZATION_PARAM,
};
use crate::domain::ports::CommerceApi;
use crate::services::query_fetcher::{expect_list, expect_single, QueryFetcher};
use crate::services::write_through::WriteThroughReport;

/// Reads go through the subscription cache; updates are written through it.
pub struct SubscriptionService<A: CommerceApi> {
    api: Arc<A>,
    cache: QueryCache<Subscription>,
    fetcher: QueryFetcher,
}

impl<A: CommerceApi> Clone for SubscriptionService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<A: CommerceApi + 'static> SubscriptionService<A> {
    pub const fn new(api: Arc<A>, cache: QueryCache<Subscription>, fetcher: QueryFetcher) -> Self {
        Self {
            api,
            cache,
            fetcher,
        }
    }

    pub const fn cache(&self) -> &QueryCache<Subscription> {
        &self.cache
    }

    /// Key of an organization's subscription list with filters.
    pub fn list_key(organization_id: &str, params: &ListSubscriptionsParams) -> QueryKey {
        QueryKey::new(
            ResourceKind::Subscriptions,
            params
                .to_query_params()
                .with(ORGANIZATION_PARAM, organization_id),
        )
    }

    pub async fn list(
        &self,
        organization_id: &str,
        params: &ListSubscriptionsParams,
    ) -> DomainResult<ListResource<Subscription>> {
        let key = Self::list_key(organization_id, params);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.cache, &key, move || async move {
                api.list_subscriptions(organization_id, params)
                    .await
                    .map(QueryData::List)
            })
            .await?;
        expect_list(data, &key)
    }

    pub async fn get(&self, id: &str) -> DomainResult<Subscription> {
        let key = QueryKey::single(ResourceKind::Subscriptions, id);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.cache, &key, move || async move {
                api.get_subscription(id).await.map(QueryData::Single)
            })
            .await?;
        expect_single(data, &key)
    }

    /// Store server-rendered data for a subscription that has no cache entry
    /// yet. Existing data wins.
    pub async fn seed(&self, subscription: Subscription) {
        let key = subscription.single_key();
        if self.cache.get_data(&key).await.is_none() {
            self.cache.set(key, QueryData::Single(subscription)).await;
        }
    }

    /// `PATCH` the subscription and write the result through the cache.
    ///
    /// The request and the write-through run on a spawned task, so dropping
    /// the returned future does not stop the cache from being updated once
    /// the server answers. On error the cache is left untouched and the
    /// error is returned as the API reported it.
    #[instrument(skip(self, update), fields(subscription_id = %id))]
    pub async fn update(&self, id: &str, update: SubscriptionUpdate) -> DomainResult<Subscription> {
        update.validate()?;

        let api = Arc::clone(&self.api);
        let cache = self.cache.clone();
        let id = id.to_string();

        let handle = tokio::spawn(async move {
            match api.update_subscription(&id, &update).await {
                Ok(updated) => {
                    let report = cache.apply_mutation_result(&updated).await;
                    log_write_through(&updated, &report);
                    Ok(updated)
                }
                Err(err) => {
                    warn!(subscription_id = %id, error = %err, "subscription update failed");
                    Err(err)
                }
            }
        });

        handle
            .await
            .map_err(|e| DomainError::TaskFailed(format!("subscription update task: {e}")))?
    }
}

fn log_write_through(subscription: &Subscription, report: &WriteThroughReport) {
    info!(
        subscription_id = %subscription.id,
        status = %subscription.status,
        organization_id = subscription.owner_id(),
        entries_updated = report.updated_keys().count(),
        lists_fabricated = report.fabricated_lists.len(),
        "subscription updated"
    );
}
