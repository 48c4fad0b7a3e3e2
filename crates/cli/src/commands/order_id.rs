//! Order id commands.
//!
//! # Usage
//!
//! ```bash
//! # Check an id a customer read out over the phone
//! yarn-cli order-id validate YARN-AB12CD34
//!
//! # Draw ids checked against the live order store
//! yarn-cli order-id generate --count 3
//! ```
//!
//! # Environment Variables
//!
//! `generate` needs `BACKEND_PROJECT_ID` and `BACKEND_API_KEY` (see the
//! storefront configuration for the optional ones).

use thiserror::Error;
use yarn_core::{OrderId, OrderIdError};
use yarn_storefront::backend::DocumentStoreClient;
use yarn_storefront::config::{BackendConfig, ConfigError};
use yarn_storefront::services::OrderIdGenerator;

/// Errors from order id commands.
#[derive(Debug, Error)]
pub enum OrderIdCommandError {
    /// The id does not match `YARN-XXXXXXXX`.
    #[error("{id} is not a valid order id: {source}")]
    Invalid {
        id: String,
        #[source]
        source: OrderIdError,
    },

    /// Backend configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Check an id against the order id format.
///
/// # Errors
///
/// Returns [`OrderIdCommandError::Invalid`] with the reason when the id is
/// malformed.
pub fn validate(id: &str) -> Result<OrderId, OrderIdCommandError> {
    OrderId::parse(id).map_err(|source| OrderIdCommandError::Invalid {
        id: id.to_string(),
        source,
    })
}

/// Generate `count` order ids checked against the configured backend.
///
/// Uses the same generator as checkout, so an unreachable backend still
/// yields ids (unchecked, with a warning logged).
///
/// # Errors
///
/// Returns an error if the backend configuration cannot be loaded.
pub async fn generate(count: u32) -> Result<Vec<OrderId>, OrderIdCommandError> {
    let config = BackendConfig::from_env()?;
    let generator = OrderIdGenerator::new(DocumentStoreClient::new(&config));

    let mut ids = Vec::new();
    for _ in 0..count {
        ids.push(generator.generate().await);
    }
    Ok(ids)
}
