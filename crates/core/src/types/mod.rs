//! Core types for Yarn Uniforms.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod price;
pub mod status;

pub use cart::{CartItem, ProductDescriptor};
pub use email::{Email, EmailError};
pub use id::{CartItemId, OrderId, OrderIdError};
pub use price::{CurrencyCode, Price};
pub use status::OrderStatus;
