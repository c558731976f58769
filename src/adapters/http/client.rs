//! reqwest implementation of the commerce API port.
//!
//! Every request waits on a shared `governor` limiter before it is sent.
//! Non-2xx responses are returned as [`DomainError::Api`] with the raw body
//! so callers can show the server's message verbatim.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ApiConfig, ListResource, ListSubscriptionsParams, Order, Product, Refund, RefundCreate,
    ResourceKind, Subscription, SubscriptionUpdate,
};
use crate::domain::ports::CommerceApi;

/// HTTP client for the commerce REST API.
#[derive(Clone)]
pub struct HttpCommerceApi {
    http: Client,
    base_url: String,
    access_token: Option<String>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl std::fmt::Debug for HttpCommerceApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCommerceApi")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpCommerceApi {
    pub fn new(config: &ApiConfig) -> DomainResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("storefront-cache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DomainError::Transport(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second).ok_or_else(|| {
            DomainError::Validation("requests_per_second must be positive".to_string())
        })?;
        let burst = NonZeroU32::new(config.burst_size).unwrap_or(per_second);
        let limiter = RateLimiter::direct(Quota::per_second(per_second).allow_burst(burst));

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            limiter: Arc::new(limiter),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Wait for the rate limiter and build an authorized request.
    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.limiter.until_ready().await;
        let builder = self
            .http
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match self.access_token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, operation: &str) -> DomainResult<T> {
        let resp = request.send().await.map_err(|e| {
            DomainError::Transport(format!("{operation} request failed: {e}"))
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(operation, status = status.as_u16(), "API request failed");
            return Err(DomainError::Api {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| DomainError::Decode(format!("{operation} response: {e}")))
    }
}

/// Turn a 404 on a single-entity endpoint into a typed not-found error.
fn not_found(kind: ResourceKind, id: &str) -> impl FnOnce(DomainError) -> DomainError + '_ {
    move |err| match err {
        DomainError::Api { status: 404, .. } => DomainError::NotFound {
            kind,
            id: id.to_string(),
        },
        other => other,
    }
}

#[async_trait]
impl CommerceApi for HttpCommerceApi {
    async fn list_subscriptions(
        &self,
        organization_id: &str,
        params: &ListSubscriptionsParams,
    ) -> DomainResult<ListResource<Subscription>> {
        let mut query = vec![("organization_id", organization_id.to_string())];
        query.extend(params.query_pairs());
        let request = self
            .request(Method::GET, "/v1/subscriptions/")
            .await
            .query(&query);
        self.send(request, "list_subscriptions").await
    }

    async fn get_subscription(&self, id: &str) -> DomainResult<Subscription> {
        let request = self
            .request(Method::GET, &format!("/v1/subscriptions/{id}"))
            .await;
        self.send(request, "get_subscription")
            .await
            .map_err(not_found(ResourceKind::Subscriptions, id))
    }

    async fn update_subscription(
        &self,
        id: &str,
        update: &SubscriptionUpdate,
    ) -> DomainResult<Subscription> {
        let request = self
            .request(Method::PATCH, &format!("/v1/subscriptions/{id}"))
            .await
            .json(update);
        // Mutation errors keep the server's status and body
        self.send(request, "update_subscription").await
    }

    async fn get_order(&self, id: &str) -> DomainResult<Order> {
        let request = self.request(Method::GET, &format!("/v1/orders/{id}")).await;
        self.send(request, "get_order")
            .await
            .map_err(not_found(ResourceKind::Orders, id))
    }

    async fn list_refunds(&self, order_id: &str) -> DomainResult<ListResource<Refund>> {
        let request = self
            .request(Method::GET, "/v1/refunds/")
            .await
            .query(&[("order_id", order_id)]);
        self.send(request, "list_refunds").await
    }

    async fn create_refund(&self, refund: &RefundCreate) -> DomainResult<Refund> {
        let request = self
            .request(Method::POST, "/v1/refunds/")
            .await
            .json(refund);
        self.send(request, "create_refund").await
    }

    async fn get_product(&self, id: &str) -> DomainResult<Product> {
        let request = self.request(Method::GET, &format!("/v1/products/{id}")).await;
        self.send(request, "get_product")
            .await
            .map_err(not_found(ResourceKind::Products, id))
    }

    async fn list_products(&self, organization_id: &str) -> DomainResult<ListResource<Product>> {
        let request = self
            .request(Method::GET, "/v1/products/")
            .await
            .query(&[("organization_id", organization_id)]);
        self.send(request, "list_products").await
    }
}
