//! Remote document store client.
//!
//! # Architecture
//!
//! - Orders live in a hosted document database (Firestore REST API)
//! - The backend is the source of truth - NO local copy of orders
//! - Found orders are cached in memory via `moka` (60 second TTL) so the
//!   tracking page does not hit the backend on every refresh
//!
//! # Operations
//!
//! - Equality lookup on the `orderId` field, limited to one result
//! - Order creation at checkout
//! - A cheap list call used by the readiness probe
//!
//! # Example
//!
//! ```rust,ignore
//! use yarn_storefront::backend::DocumentStoreClient;
//!
//! let client = DocumentStoreClient::new(&config.backend);
//! let order = client.find_order(&order_id).await?;
//! ```

mod client;
pub mod documents;

pub use client::DocumentStoreClient;

use thiserror::Error;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A document did not have the expected shape.
    #[error("Malformed document: {0}")]
    Decode(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::Api {
            status: 403,
            message: "PERMISSION_DENIED".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 403 - PERMISSION_DENIED");

        let err = BackendError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");
    }
}
