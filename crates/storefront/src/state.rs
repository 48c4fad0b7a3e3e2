//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::DocumentStoreClient;
use crate::config::StorefrontConfig;
use crate::services::{EmailService, OrderIdGenerator};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the backend client and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    backend: DocumentStoreClient,
    order_ids: OrderIdGenerator<DocumentStoreClient>,
    email: Option<EmailService>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Email is enabled when SMTP is configured and the relay can be set
    /// up; otherwise confirmations are skipped.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let backend = DocumentStoreClient::new(&config.backend);
        let order_ids = OrderIdGenerator::new(backend.clone());

        let email = config.email.as_ref().and_then(|email_config| {
            EmailService::new(email_config, &config.base_url)
                .inspect_err(|e| {
                    tracing::error!(error = %e, "Failed to configure SMTP, emails disabled");
                })
                .ok()
        });

        if email.is_none() {
            tracing::info!("Order confirmation emails disabled");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                order_ids,
                email,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the document store client.
    #[must_use]
    pub fn backend(&self) -> &DocumentStoreClient {
        &self.inner.backend
    }

    /// Get a reference to the order id generator.
    #[must_use]
    pub fn order_ids(&self) -> &OrderIdGenerator<DocumentStoreClient> {
        &self.inner.order_ids
    }

    /// Get the email service, if configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }
}
