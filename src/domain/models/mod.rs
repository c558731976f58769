pub mod cache_entry;
pub mod config;
pub mod entity;
pub mod list;
pub mod order;
pub mod product;
pub mod query_key;
pub mod refund;
pub mod subscription;

pub use cache_entry::{CacheEntry, QueryData};
pub use config::{ApiConfig, CacheConfig, Config, ListMissPolicy, LoggingConfig, RetryConfig};
pub use entity::Entity;
pub use list::{ListResource, Pagination};
pub use order::{Order, OrderStatus};
pub use product::Product;
pub use query_key::{
    ParamValue, QueryKey, QueryParams, ResourceKind, ID_PARAM, ORDER_PARAM, ORGANIZATION_PARAM,
};
pub use refund::{Refund, RefundCreate, RefundReason, RefundStatus};
pub use subscription::{
    CancellationReason, ListSubscriptionsParams, Subscription, SubscriptionStatus,
    SubscriptionUpdate,
};
