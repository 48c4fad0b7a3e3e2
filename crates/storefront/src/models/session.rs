//! Session-related constants.
//!
//! The session is the visitor-scoped durable store: it outlives a single
//! request and is the only place cart state is kept between requests.

/// Session keys.
pub mod keys {
    /// Key holding the serialized cart snapshot (a JSON array of items).
    pub const CART: &str = "yarn_cart";
}
