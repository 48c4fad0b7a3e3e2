//! CLI command implementations.

pub mod order;
pub mod order_id;
