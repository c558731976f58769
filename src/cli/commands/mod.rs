//! CLI command implementations

pub mod order;
pub mod product;
pub mod subscription;
