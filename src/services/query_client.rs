//! Entry point wiring the caches and services together.

use std::sync::Arc;

use crate::adapters::cache::{CacheSettings, QueryCache};
use crate::domain::models::{CacheConfig, RetryConfig};
use crate::domain::ports::CommerceApi;
use crate::services::order_service::OrderService;
use crate::services::product_service::ProductService;
use crate::services::query_fetcher::QueryFetcher;
use crate::services::retry::RetryPolicy;
use crate::services::subscription_service::SubscriptionService;

/// Owns one cache per entity type and the services reading through them.
///
/// Construct one per session and pass it (or clones of it) to whatever
/// needs data; clones share the same caches.
pub struct QueryClient<A: CommerceApi> {
    pub subscriptions: SubscriptionService<A>,
    pub orders: OrderService<A>,
    pub products: ProductService<A>,
}

impl<A: CommerceApi> Clone for QueryClient<A> {
    fn clone(&self) -> Self {
        Self {
            subscriptions: self.subscriptions.clone(),
            orders: self.orders.clone(),
            products: self.products.clone(),
        }
    }
}

impl<A: CommerceApi + 'static> QueryClient<A> {
    pub fn new(api: Arc<A>, cache: &CacheConfig, retry: &RetryConfig) -> Self {
        let settings = CacheSettings::from_config(cache);
        let fetcher = QueryFetcher::new(RetryPolicy::from_config(retry));

        let products = ProductService::new(
            Arc::clone(&api),
            QueryCache::new(settings),
            fetcher.clone(),
        );
        let orders = OrderService::new(
            Arc::clone(&api),
            QueryCache::new(settings),
            QueryCache::new(settings),
            products.clone(),
            fetcher.clone(),
        );
        let subscriptions = SubscriptionService::new(api, QueryCache::new(settings), fetcher);

        Self {
            subscriptions,
            orders,
            products,
        }
    }

    /// Drop expired entries from every cache.
    pub async fn collect_garbage(&self) -> usize {
        self.subscriptions.cache().collect_garbage().await
            + self.orders.orders_cache().collect_garbage().await
            + self.orders.refunds_cache().collect_garbage().await
            + self.products.cache().collect_garbage().await
    }
}
