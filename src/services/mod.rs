//! Query services: read-through fetching, mutations and write-through.

pub mod order_service;
pub mod product_service;
pub mod query_client;
pub mod query_fetcher;
pub mod retry;
pub mod subscription_service;
pub mod write_through;

pub use order_service::{OrderDetail, OrderService};
pub use product_service::ProductService;
pub use query_client::QueryClient;
pub use query_fetcher::QueryFetcher;
pub use retry::RetryPolicy;
pub use subscription_service::SubscriptionService;
pub use write_through::{apply_mutation_result, write_through, CacheState, WriteThroughReport};
