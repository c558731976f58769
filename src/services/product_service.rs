//! Product queries.

use std::sync::Arc;

use crate::adapters::cache::QueryCache;
use crate::domain::errors::DomainResult;
use crate::domain::models::{ListResource, Product, QueryData, QueryKey, ResourceKind};
use crate::domain::ports::CommerceApi;
use crate::services::query_fetcher::{expect_list, expect_single, QueryFetcher};

pub struct ProductService<A: CommerceApi> {
    api: Arc<A>,
    cache: QueryCache<Product>,
    fetcher: QueryFetcher,
}

impl<A: CommerceApi> Clone for ProductService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: self.cache.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

impl<A: CommerceApi + 'static> ProductService<A> {
    pub const fn new(api: Arc<A>, cache: QueryCache<Product>, fetcher: QueryFetcher) -> Self {
        Self {
            api,
            cache,
            fetcher,
        }
    }

    pub const fn cache(&self) -> &QueryCache<Product> {
        &self.cache
    }

    pub async fn get(&self, id: &str) -> DomainResult<Product> {
        let key = QueryKey::single(ResourceKind::Products, id);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.cache, &key, move || async move {
                api.get_product(id).await.map(QueryData::Single)
            })
            .await?;
        expect_single(data, &key)
    }

    pub async fn list(&self, organization_id: &str) -> DomainResult<ListResource<Product>> {
        let key = QueryKey::list(ResourceKind::Products, organization_id);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.cache, &key, move || async move {
                api.list_products(organization_id).await.map(QueryData::List)
            })
            .await?;
        expect_list(data, &key)
    }
}
