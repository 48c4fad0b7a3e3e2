//! Order id generation against a mock document store.

#![allow(clippy::unwrap_used)]

use yarn_core::OrderId;
use yarn_integration_tests::{MockDocumentStore, backend_config};
use yarn_storefront::backend::DocumentStoreClient;
use yarn_storefront::services::{OrderIdGenerator, OrderLookup};

async fn client_for(store: &MockDocumentStore) -> DocumentStoreClient {
    let base_url = store.spawn().await;
    DocumentStoreClient::new(&backend_config(&base_url))
}

#[tokio::test]
async fn test_lookup_sees_stored_order_id() {
    let store = MockDocumentStore::default();
    store.insert_order_id("YARN-TAKEN001");
    let client = client_for(&store).await;

    let taken = OrderId::parse("YARN-TAKEN001").unwrap();
    let free = OrderId::parse("YARN-FREE0001").unwrap();
    assert!(client.order_id_exists(&taken).await.unwrap());
    assert!(!client.order_id_exists(&free).await.unwrap());
}

#[tokio::test]
async fn test_generated_id_is_checked_once_when_free() {
    let store = MockDocumentStore::default();
    let generator = OrderIdGenerator::new(client_for(&store).await);

    let id = generator.generate().await;
    assert!(OrderId::is_valid(id.as_str()));
    assert_eq!(store.query_count(), 1);
}

#[tokio::test]
async fn test_unavailable_backend_still_yields_valid_id() {
    let store = MockDocumentStore::default();
    store.set_unavailable(true);
    let client = client_for(&store).await;

    let taken = OrderId::parse("YARN-TAKEN001").unwrap();
    assert!(client.order_id_exists(&taken).await.is_err());

    let id = OrderIdGenerator::new(client).generate().await;
    assert!(OrderId::is_valid(id.as_str()));
}

#[tokio::test]
async fn test_generated_ids_are_distinct() {
    let store = MockDocumentStore::default();
    let generator = OrderIdGenerator::new(client_for(&store).await);

    let mut ids = Vec::new();
    for _ in 0..20 {
        ids.push(generator.generate().await);
    }
    ids.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    ids.dedup();
    assert_eq!(ids.len(), 20);
}
