//! Remote commerce API port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ListResource, ListSubscriptionsParams, Order, Product, Refund, RefundCreate, Subscription,
    SubscriptionUpdate,
};

/// Resource-oriented access to the commerce API.
///
/// Implementations return the server's canonical entities. Errors are
/// reported as [`DomainError`](crate::domain::errors::DomainError) and are
/// never retried here; retrying reads is the query layer's job.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    // Subscriptions

    /// `GET /v1/subscriptions/?organization_id=..`
    async fn list_subscriptions(
        &self,
        organization_id: &str,
        params: &ListSubscriptionsParams,
    ) -> DomainResult<ListResource<Subscription>>;

    /// `GET /v1/subscriptions/{id}`
    async fn get_subscription(&self, id: &str) -> DomainResult<Subscription>;

    /// `PATCH /v1/subscriptions/{id}`
    async fn update_subscription(
        &self,
        id: &str,
        update: &SubscriptionUpdate,
    ) -> DomainResult<Subscription>;

    // Orders and refunds

    /// `GET /v1/orders/{id}`
    async fn get_order(&self, id: &str) -> DomainResult<Order>;

    /// `GET /v1/refunds/?order_id=..`
    async fn list_refunds(&self, order_id: &str) -> DomainResult<ListResource<Refund>>;

    /// `POST /v1/refunds/`
    async fn create_refund(&self, refund: &RefundCreate) -> DomainResult<Refund>;

    // Products

    /// `GET /v1/products/{id}`
    async fn get_product(&self, id: &str) -> DomainResult<Product>;

    /// `GET /v1/products/?organization_id=..`
    async fn list_products(&self, organization_id: &str) -> DomainResult<ListResource<Product>>;
}
