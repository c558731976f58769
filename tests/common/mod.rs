//! Common test utilities for integration tests
//!
//! Provides an in-memory commerce API, entity fixtures and a client
//! factory shared across the integration test files.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use storefront_cache::domain::models::{
    CacheConfig, ListResource, ListSubscriptionsParams, Order, OrderStatus, Pagination, Product,
    Refund, RefundCreate, RefundStatus, RetryConfig, Subscription, SubscriptionStatus,
    SubscriptionUpdate,
};
use storefront_cache::{CommerceApi, DomainError, DomainResult, QueryClient, ResourceKind};

#[derive(Default)]
struct FakeState {
    subscriptions: Vec<Subscription>,
    orders: HashMap<String, Order>,
    products: HashMap<String, Product>,
    refunds: Vec<Refund>,
    failures: HashMap<&'static str, VecDeque<DomainError>>,
    calls: HashMap<&'static str, usize>,
    refund_seq: usize,
}

/// In-memory commerce API with call counting and failure injection
#[derive(Default)]
pub struct FakeCommerceApi {
    state: Mutex<FakeState>,
    update_delay: Mutex<Option<Duration>>,
}

impl FakeCommerceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(self, subscription: Subscription) -> Self {
        self.insert_product(subscription.product.clone());
        self.state.lock().unwrap().subscriptions.push(subscription);
        self
    }

    pub fn with_order(self, order: Order) -> Self {
        self.insert_product(order.product.clone());
        self.state.lock().unwrap().orders.insert(order.id.clone(), order);
        self
    }

    pub fn with_product(self, product: Product) -> Self {
        self.insert_product(product);
        self
    }

    fn insert_product(&self, product: Product) {
        self.state.lock().unwrap().products.insert(product.id.clone(), product);
    }

    /// Make the next call of `operation` return `error`
    pub fn fail_next(&self, operation: &'static str, error: DomainError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delay every subscription update by `delay`
    pub fn delay_updates(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().unwrap().calls.get(operation).copied().unwrap_or(0)
    }

    /// Server-side copy of a subscription
    pub fn stored_subscription(&self, id: &str) -> Option<Subscription> {
        self.state
            .lock()
            .unwrap()
            .subscriptions
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    fn begin(&self, operation: &'static str) -> DomainResult<()> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        match state.failures.get_mut(operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn list_of<T>(items: Vec<T>) -> ListResource<T> {
    let total = items.len() as u64;
    ListResource::new(
        items,
        Pagination {
            total_count: total,
            max_page: 1,
        },
    )
}

#[async_trait]
impl CommerceApi for FakeCommerceApi {
    async fn list_subscriptions(
        &self,
        organization_id: &str,
        params: &ListSubscriptionsParams,
    ) -> DomainResult<ListResource<Subscription>> {
        self.begin("list_subscriptions")?;
        let state = self.state.lock().unwrap();
        let items = state
            .subscriptions
            .iter()
            .filter(|s| s.product.organization_id == organization_id)
            .filter(|s| params.status.map_or(true, |status| s.status == status))
            .filter(|s| params.product_id.as_ref().map_or(true, |p| &s.product.id == p))
            .cloned()
            .collect();
        Ok(list_of(items))
    }

    async fn get_subscription(&self, id: &str) -> DomainResult<Subscription> {
        self.begin("get_subscription")?;
        self.stored_subscription(id).ok_or_else(|| DomainError::NotFound {
            kind: ResourceKind::Subscriptions,
            id: id.to_string(),
        })
    }

    async fn update_subscription(
        &self,
        id: &str,
        update: &SubscriptionUpdate,
    ) -> DomainResult<Subscription> {
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.begin("update_subscription")?;

        let mut state = self.state.lock().unwrap();
        let new_product = match update {
            SubscriptionUpdate::Product { product_id } => Some(
                state
                    .products
                    .get(product_id)
                    .cloned()
                    .ok_or_else(|| DomainError::Api {
                        status: 422,
                        body: format!("{{\"detail\":\"unknown product {product_id}\"}}"),
                    })?,
            ),
            _ => None,
        };
        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::NotFound {
                kind: ResourceKind::Subscriptions,
                id: id.to_string(),
            })?;

        match update {
            SubscriptionUpdate::Product { .. } => {
                if let Some(product) = new_product {
                    subscription.product = product;
                }
            }
            SubscriptionUpdate::Cancel {
                cancel_at_period_end,
                ..
            } => {
                subscription.cancel_at_period_end = *cancel_at_period_end;
            }
            SubscriptionUpdate::Revoke { .. } => {
                subscription.status = SubscriptionStatus::Canceled;
                subscription.cancel_at_period_end = false;
                subscription.canceled_at = Some(fixed_time());
                subscription.ended_at = Some(fixed_time());
            }
        }
        Ok(subscription.clone())
    }

    async fn get_order(&self, id: &str) -> DomainResult<Order> {
        self.begin("get_order")?;
        self.state
            .lock()
            .unwrap()
            .orders
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound {
                kind: ResourceKind::Orders,
                id: id.to_string(),
            })
    }

    async fn list_refunds(&self, order_id: &str) -> DomainResult<ListResource<Refund>> {
        self.begin("list_refunds")?;
        let state = self.state.lock().unwrap();
        let items = state
            .refunds
            .iter()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect();
        Ok(list_of(items))
    }

    async fn create_refund(&self, refund: &RefundCreate) -> DomainResult<Refund> {
        self.begin("create_refund")?;
        let mut state = self.state.lock().unwrap();
        state.refund_seq += 1;
        let id = format!("ref_{}", state.refund_seq);
        let order = state.orders.get_mut(&refund.order_id).ok_or_else(|| DomainError::NotFound {
            kind: ResourceKind::Orders,
            id: refund.order_id.clone(),
        })?;
        order.refunded_amount += refund.amount;
        order.status = if order.refunded_amount >= order.net_amount {
            OrderStatus::Refunded
        } else {
            OrderStatus::PartiallyRefunded
        };
        let created = Refund {
            id,
            status: RefundStatus::Succeeded,
            reason: refund.reason,
            amount: refund.amount,
            tax_amount: 0,
            currency: order.currency.clone(),
            order_id: refund.order_id.clone(),
            organization_id: order.product.organization_id.clone(),
            comment: refund.comment.clone(),
            revoke_benefits: refund.revoke_benefits,
            created_at: fixed_time(),
        };
        state.refunds.insert(0, created.clone());
        Ok(created)
    }

    async fn get_product(&self, id: &str) -> DomainResult<Product> {
        self.begin("get_product")?;
        self.state
            .lock()
            .unwrap()
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound {
                kind: ResourceKind::Products,
                id: id.to_string(),
            })
    }

    async fn list_products(&self, organization_id: &str) -> DomainResult<ListResource<Product>> {
        self.begin("list_products")?;
        let state = self.state.lock().unwrap();
        let mut items: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.organization_id == organization_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list_of(items))
    }
}

pub fn fixed_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn product(id: &str, organization_id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        description: None,
        organization_id: organization_id.to_string(),
        is_recurring: true,
        is_archived: false,
        created_at: Some(fixed_time()),
        modified_at: None,
    }
}

pub fn subscription(id: &str, organization_id: &str, status: SubscriptionStatus) -> Subscription {
    Subscription {
        id: id.to_string(),
        status,
        amount: Some(1500),
        currency: Some("usd".to_string()),
        recurring_interval: Some("month".to_string()),
        cancel_at_period_end: false,
        current_period_start: Some(fixed_time()),
        current_period_end: None,
        started_at: Some(fixed_time()),
        canceled_at: None,
        ended_at: None,
        customer_id: Some("cus_1".to_string()),
        product: product("prod_basic", organization_id),
    }
}

pub fn order(id: &str, organization_id: &str) -> Order {
    Order {
        id: id.to_string(),
        status: OrderStatus::Paid,
        paid: true,
        created_at: fixed_time(),
        billing_reason: "subscription_create".to_string(),
        subtotal_amount: 2000,
        discount_amount: 0,
        net_amount: 2000,
        tax_amount: 0,
        total_amount: 2000,
        refunded_amount: 0,
        currency: "usd".to_string(),
        customer_id: Some("cus_1".to_string()),
        subscription_id: None,
        is_invoice_generated: false,
        product: product("prod_basic", organization_id),
    }
}

/// Retry quickly so tests exercising retries stay fast
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
    }
}

pub fn client(api: Arc<FakeCommerceApi>) -> QueryClient<FakeCommerceApi> {
    QueryClient::new(api, &CacheConfig::default(), &fast_retry(2))
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
