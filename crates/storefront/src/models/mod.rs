//! Domain models for the storefront.
//!
//! - [`order`] - Order records as stored in the remote document store
//! - [`session`] - Keys for values kept in the visitor session

pub mod order;
pub mod session;

pub use order::{Customer, Order};
