//! Yarn Core - Shared types library.
//!
//! This crate provides common types used across all Yarn Uniforms components:
//! - `storefront` - Public ordering API (cart, checkout, order tracking)
//! - `cli` - Command-line tools for order id checks and lookups
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no network access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Order ids, cart line items, prices, emails, and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
