//! Order detail queries and refund creation.
//!
//! Creating a refund changes the order's refunded amount and status on the
//! server, and the response only carries the refund. Instead of guessing
//! the new order state, the order entry and its refund list are invalidated
//! so the next read refetches them.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::adapters::cache::QueryCache;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    Entity, ListResource, Order, Product, QueryData, QueryKey, QueryParams, Refund, RefundCreate,
    ResourceKind, ORDER_PARAM,
};
use crate::domain::ports::CommerceApi;
use crate::services::product_service::ProductService;
use crate::services::query_fetcher::{expect_list, expect_single, QueryFetcher};

/// Everything the order detail view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub product: Product,
    pub refunds: ListResource<Refund>,
}

impl OrderDetail {
    pub const fn can_refund(&self) -> bool {
        self.order.can_refund()
    }
}

pub struct OrderService<A: CommerceApi> {
    api: Arc<A>,
    orders: QueryCache<Order>,
    refunds: QueryCache<Refund>,
    products: ProductService<A>,
    fetcher: QueryFetcher,
}

impl<A: CommerceApi> Clone for OrderService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            orders: self.orders.clone(),
            refunds: self.refunds.clone(),
            products: self.products.clone(),
            fetcher: self.fetcher.clone(),
        }
    }
}

/// Key of the refund list of one order.
pub fn refunds_key(order_id: &str) -> QueryKey {
    QueryKey::new(
        ResourceKind::Refunds,
        QueryParams::new().with(ORDER_PARAM, order_id),
    )
}

impl<A: CommerceApi + 'static> OrderService<A> {
    pub const fn new(
        api: Arc<A>,
        orders: QueryCache<Order>,
        refunds: QueryCache<Refund>,
        products: ProductService<A>,
        fetcher: QueryFetcher,
    ) -> Self {
        Self {
            api,
            orders,
            refunds,
            products,
            fetcher,
        }
    }

    pub const fn orders_cache(&self) -> &QueryCache<Order> {
        &self.orders
    }

    pub const fn refunds_cache(&self) -> &QueryCache<Refund> {
        &self.refunds
    }

    pub async fn get(&self, id: &str) -> DomainResult<Order> {
        let key = QueryKey::single(ResourceKind::Orders, id);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.orders, &key, move || async move {
                api.get_order(id).await.map(QueryData::Single)
            })
            .await?;
        expect_single(data, &key)
    }

    /// Store server-rendered order data when nothing is cached yet.
    pub async fn seed(&self, order: Order) {
        let key = order.single_key();
        if self.orders.get_data(&key).await.is_none() {
            self.orders.set(key, QueryData::Single(order)).await;
        }
    }

    pub async fn refunds(&self, order_id: &str) -> DomainResult<ListResource<Refund>> {
        let key = refunds_key(order_id);
        let api = &self.api;
        let data = self
            .fetcher
            .fetch(&self.refunds, &key, move || async move {
                api.list_refunds(order_id).await.map(QueryData::List)
            })
            .await?;
        expect_list(data, &key)
    }

    pub async fn product_for(&self, order: &Order) -> DomainResult<Product> {
        self.products.get(&order.product.id).await
    }

    /// Order, product and refunds; the last two are fetched concurrently.
    #[instrument(skip(self))]
    pub async fn detail(&self, id: &str) -> DomainResult<OrderDetail> {
        let order = self.get(id).await?;
        let (product, refunds) =
            futures::try_join!(self.product_for(&order), self.refunds(&order.id))?;
        Ok(OrderDetail {
            order,
            product,
            refunds,
        })
    }

    /// Create a refund, then invalidate the order and its refund list.
    ///
    /// When the order is cached, refunds it cannot take are rejected before
    /// any request is sent.
    #[instrument(skip(self, refund), fields(order_id = %refund.order_id, amount = refund.amount))]
    pub async fn create_refund(&self, refund: RefundCreate) -> DomainResult<Refund> {
        refund.validate()?;

        let order_key = QueryKey::single(ResourceKind::Orders, refund.order_id.as_str());
        if let Some(order) = self.orders.get_data(&order_key).await.and_then(QueryData::into_single) {
            if !order.can_refund() {
                return Err(DomainError::Validation(format!(
                    "order {} cannot be refunded",
                    order.id
                )));
            }
            if refund.amount > order.refundable_amount() {
                return Err(DomainError::Validation(format!(
                    "refund amount {} exceeds refundable amount {}",
                    refund.amount,
                    order.refundable_amount()
                )));
            }
        }

        let api = Arc::clone(&self.api);
        let orders = self.orders.clone();
        let refunds = self.refunds.clone();

        let handle = tokio::spawn(async move {
            let created = api.create_refund(&refund).await?;
            orders.invalidate(&order_key).await;
            refunds.invalidate(&refunds_key(&refund.order_id)).await;
            info!(
                refund_id = %created.id,
                order_id = %created.order_id,
                amount = created.amount,
                "refund created"
            );
            Ok::<_, DomainError>(created)
        });

        handle
            .await
            .map_err(|e| DomainError::TaskFailed(format!("refund task: {e}")))?
    }
}
