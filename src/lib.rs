//! Storefront Cache - commerce dashboard data layer
//!
//! Reads subscriptions, orders, products and refunds from a commerce API
//! through keyed read-through caches, and keeps those caches consistent
//! after mutations by writing the server's response into every entry that
//! holds the mutated entity.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, query keys, errors and the API port
//! - **Adapters** (`adapters`): the in-memory query cache and the HTTP client
//! - **Service Layer** (`services`): read-through fetching, write-through and
//!   the per-resource services
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use storefront_cache::{Config, HttpCommerceApi, QueryClient, SubscriptionUpdate};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let api = Arc::new(HttpCommerceApi::new(&config.api)?);
//!     let client = QueryClient::new(api, &config.cache, &config.retry);
//!
//!     let list = client.subscriptions.list("org_1", &Default::default()).await?;
//!     let canceled = client
//!         .subscriptions
//!         .update(&list.items[0].id, SubscriptionUpdate::cancel_at_period_end(None, None))
//!         .await?;
//!     // The cached list now holds `canceled` without a refetch.
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::cache::{CacheEvent, CacheSettings, QueryCache, SetData};
pub use adapters::http::HttpCommerceApi;
pub use domain::models::{
    CacheConfig, CacheEntry, Config, Entity, ListMissPolicy, ListResource, LoggingConfig, Order,
    Pagination, Product, QueryData, QueryKey, QueryParams, Refund, RefundCreate, ResourceKind,
    RetryConfig, Subscription, SubscriptionStatus, SubscriptionUpdate,
};
pub use domain::ports::CommerceApi;
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    apply_mutation_result, write_through, OrderService, ProductService, QueryClient,
    SubscriptionService, WriteThroughReport,
};
