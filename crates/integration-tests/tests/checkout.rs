//! End-to-end cart, checkout and tracking over HTTP.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use yarn_core::OrderId;
use yarn_integration_tests::TestContext;

fn scrubs(id: &str, quantity: u32) -> Value {
    json!({
        "id": id,
        "sector": "healthcare",
        "garment_type": "scrubs",
        "size": "M",
        "quantity": quantity,
        "unit_price": { "amount": "85.00", "currency_code": "SAR" },
        "metadata": { "colour": "navy" }
    })
}

fn customer() -> Value {
    json!({
        "name": "Noura Al-Harbi",
        "email": "noura@clinic.example",
        "organization": "Riyadh Clinic",
        "notes": "Embroider the clinic logo on the chest"
    })
}

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;

    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_when_backend_down() {
    let ctx = TestContext::new().await;
    ctx.store.set_unavailable(true);

    let resp = ctx.client.get(ctx.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_checkout_then_track() {
    let ctx = TestContext::new().await;

    for (id, quantity) in [("a", 4), ("b", 2)] {
        let resp = ctx
            .client
            .post(ctx.url("/cart/items"))
            .json(&scrubs(id, quantity))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&customer())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let placed: Value = resp.json().await.unwrap();
    let order_id = placed["order_id"].as_str().unwrap().to_string();
    assert!(OrderId::is_valid(&order_id));
    assert_eq!(placed["status"], "pending");
    assert_eq!(placed["item_count"], 6);
    assert_eq!(ctx.store.order_ids(), vec![order_id.clone()]);

    // The cart is emptied once the order is stored
    let cart: Value = ctx
        .client
        .get(ctx.url("/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"], json!([]));

    let resp = ctx
        .client
        .get(ctx.url(&format!("/track/{order_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let tracked: Value = resp.json().await.unwrap();
    assert_eq!(tracked["order_id"], order_id.as_str());
    assert_eq!(tracked["status"], "pending");
    assert_eq!(tracked["is_final"], false);
    assert_eq!(tracked["item_count"], 6);
}

#[tokio::test]
async fn test_failed_order_write_keeps_cart() {
    let ctx = TestContext::new().await;

    ctx.client
        .post(ctx.url("/cart/items"))
        .json(&scrubs("a", 1))
        .send()
        .await
        .unwrap();

    ctx.store.set_unavailable(true);
    let resp = ctx
        .client
        .post(ctx.url("/orders"))
        .json(&customer())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let cart: Value = ctx
        .client
        .get(ctx.url("/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart["items"][0]["id"], "a");
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let ctx = TestContext::new().await;

    let resp = ctx
        .client
        .get(ctx.url("/track/YARN-NOTHERE"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ctx
        .client
        .get(ctx.url("/track/YARN-N0TTHERE"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let ctx = TestContext::new().await;

    ctx.client
        .post(ctx.url("/cart/items"))
        .json(&scrubs("a", 1))
        .send()
        .await
        .unwrap();

    let stranger: Value = reqwest::Client::new()
        .get(ctx.url("/cart"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stranger["items"], json!([]));
}
