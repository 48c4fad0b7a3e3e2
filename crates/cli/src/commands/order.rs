//! Order lookup commands.
//!
//! # Usage
//!
//! ```bash
//! yarn-cli order show YARN-AB12CD34
//! ```

use thiserror::Error;
use yarn_storefront::backend::{BackendError, DocumentStoreClient};
use yarn_storefront::config::{BackendConfig, ConfigError};
use yarn_storefront::models::Order;

use super::order_id::{self, OrderIdCommandError};

/// Errors from order commands.
#[derive(Debug, Error)]
pub enum OrderCommandError {
    #[error(transparent)]
    OrderId(#[from] OrderIdCommandError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// No order carries the id.
    #[error("No order found with id {0}")]
    NotFound(String),
}

/// Fetch an order by its public id.
///
/// # Errors
///
/// Returns an error if the id is malformed, the backend cannot be reached,
/// or no order carries the id.
pub async fn show(id: &str) -> Result<Order, OrderCommandError> {
    let order_id = order_id::validate(id)?;

    let config = BackendConfig::from_env()?;
    let client = DocumentStoreClient::new(&config);

    tracing::info!(order_id = %order_id, "Looking up order");
    client
        .find_order(&order_id)
        .await?
        .ok_or_else(|| OrderCommandError::NotFound(order_id.to_string()))
}
