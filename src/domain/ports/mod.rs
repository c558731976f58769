//! Port trait definitions (Hexagonal Architecture)
//!
//! - CommerceApi: remote order, product, refund and subscription endpoints
//!
//! Adapters implement these traits so the query services stay independent
//! of the transport.

pub mod commerce_api;

pub use commerce_api::CommerceApi;
