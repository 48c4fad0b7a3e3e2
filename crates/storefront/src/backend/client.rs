//! Document store REST client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use yarn_core::OrderId;

use super::BackendError;
use super::documents::{self, Document, QueryResult, WriteDocument};
use crate::config::BackendConfig;
use crate::models::Order;

/// Name of the field the order lookup filters on.
const ORDER_ID_FIELD: &str = "orderId";

/// How long a found order stays cached for tracking lookups.
const ORDER_CACHE_TTL: Duration = Duration::from_secs(60);

/// Client for the remote document store.
///
/// Cheap to clone; clones share the HTTP connection pool and the order
/// cache.
#[derive(Clone)]
pub struct DocumentStoreClient {
    inner: Arc<DocumentStoreClientInner>,
}

struct DocumentStoreClientInner {
    client: reqwest::Client,
    /// `{base}/projects/{project}/databases/(default)/documents`
    documents_url: String,
    api_key: SecretString,
    orders_collection: String,
    cache: Cache<OrderId, Order>,
}

impl DocumentStoreClient {
    /// Create a new document store client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ORDER_CACHE_TTL)
            .build();

        let documents_url = format!(
            "{}/projects/{}/databases/(default)/documents",
            config.base_url, config.project_id
        );

        Self {
            inner: Arc::new(DocumentStoreClientInner {
                client: reqwest::Client::new(),
                documents_url,
                api_key: config.api_key.clone(),
                orders_collection: config.orders_collection.clone(),
                cache,
            }),
        }
    }

    /// Build an endpoint URL under the documents root, with the API key and
    /// any extra query parameters appended.
    fn endpoint(&self, suffix: &str, params: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&format!("{}{suffix}", self.inner.documents_url))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("key", self.inner.api_key.expose_secret());
        }
        Ok(url)
    }

    /// Send a request and decode a JSON body, mapping backend failures.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Document store returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse document store response"
            );
            BackendError::Parse(e)
        })
    }

    /// Run an equality query on the orders collection, limited to one result.
    async fn query_order(&self, order_id: &OrderId) -> Result<Option<Document>, BackendError> {
        let body = documents::field_equals_query(
            &self.inner.orders_collection,
            ORDER_ID_FIELD,
            order_id.as_str(),
            1,
        );

        let request = self
            .inner
            .client
            .post(self.endpoint(":runQuery", &[])?)
            .json(&body);

        let results: Vec<QueryResult> = self.send(request).await?;
        Ok(results.into_iter().find_map(|r| r.document))
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Whether any order already carries `order_id`.
    ///
    /// Always asks the backend; the cache is not consulted, since a miss
    /// there says nothing about the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order_exists(&self, order_id: &OrderId) -> Result<bool, BackendError> {
        Ok(self.query_order(order_id).await?.is_some())
    }

    /// Fetch an order by its public id.
    ///
    /// Found orders are cached for 60 seconds. Misses are not cached, so a
    /// just-created order is visible immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or the stored document
    /// does not decode as an order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, BackendError> {
        if let Some(order) = self.inner.cache.get(order_id).await {
            debug!("Cache hit for order");
            return Ok(Some(order));
        }

        let Some(document) = self.query_order(order_id).await? else {
            return Ok(None);
        };

        let order: Order = documents::decode_fields(document.fields)?;
        self.inner
            .cache
            .insert(order_id.clone(), order.clone())
            .await;

        Ok(Some(order))
    }

    /// Write a new order document.
    ///
    /// The document key is chosen by the backend; the public id lives in the
    /// `orderId` field.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be encoded or the API request
    /// fails.
    #[instrument(skip(self, order), fields(order_id = %order.order_id))]
    pub async fn create_order(&self, order: &Order) -> Result<(), BackendError> {
        let body = WriteDocument {
            fields: documents::encode_fields(order)?,
        };

        let request = self
            .inner
            .client
            .post(self.endpoint(&format!("/{}", self.inner.orders_collection), &[])?)
            .json(&body);

        let created: Document = self.send(request).await?;
        tracing::info!(
            document = created.name.as_deref().unwrap_or("<unnamed>"),
            "Order document created"
        );
        Ok(())
    }

    /// Cheap round trip used by the readiness probe.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or rejects the key.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let url = self.endpoint(
            &format!("/{}", self.inner.orders_collection),
            &[("pageSize", "1"), ("mask.fieldPaths", ORDER_ID_FIELD)],
        )?;
        let request = self.inner.client.get(url);

        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_url() {
        let client = DocumentStoreClient::new(&crate::test_support::config().backend);
        assert_eq!(
            client.inner.documents_url,
            "http://127.0.0.1:9/v1/projects/yarn-test/databases/(default)/documents"
        );
        assert_eq!(client.inner.orders_collection, "orders");
    }

    #[test]
    fn test_endpoint_appends_key_last() {
        let client = DocumentStoreClient::new(&crate::test_support::config().backend);
        let url = client
            .endpoint("/orders", &[("pageSize", "1")])
            .unwrap_or_else(|e| panic!("endpoint: {e}"));
        assert_eq!(url.path(), "/v1/projects/yarn-test/databases/(default)/documents/orders");
        assert_eq!(url.query(), Some("pageSize=1&key=test-api-key"));
    }

    #[test]
    fn test_run_query_endpoint() {
        let client = DocumentStoreClient::new(&crate::test_support::config().backend);
        let url = client
            .endpoint(":runQuery", &[])
            .unwrap_or_else(|e| panic!("endpoint: {e}"));
        assert!(url.path().ends_with("/documents:runQuery"));
    }
}
