//! HTTP adapter for the commerce API port.

pub mod client;

pub use client::HttpCommerceApi;
