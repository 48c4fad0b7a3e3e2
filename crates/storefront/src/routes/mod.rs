//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health              - Liveness
//! GET    /health/ready        - Readiness (document store reachable)
//!
//! # Cart (session scoped)
//! GET    /cart                - Current cart
//! POST   /cart/items          - Add a line item
//! DELETE /cart/items/{id}     - Remove a line item
//! DELETE /cart                - Empty the cart
//!
//! # Orders
//! POST   /orders              - Checkout the session cart
//! GET    /track/{order_id}    - Order status by public id
//! ```

pub mod cart;
pub mod health;
pub mod orders;
pub mod track;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, Request, header},
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::middleware::{
    cart_rate_limiter, create_session_layer, request_id_middleware, tracking_rate_limiter,
};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route("/items/{id}", delete(cart::remove_item))
        .route_layer(cart_rate_limiter())
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(orders::checkout))
        .route_layer(cart_rate_limiter())
}

/// Create the tracking routes router.
pub fn track_routes() -> Router<AppState> {
    Router::new()
        .route("/{order_id}", get(track::show))
        .route_layer(tracking_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
        .merge(order_routes())
        .nest("/track", track_routes())
}

/// CORS for the storefront frontend at the configured base URL.
fn cors_layer(base_url: &str) -> Option<CorsLayer> {
    let origin = HeaderValue::from_str(base_url.trim_end_matches('/'))
        .inspect_err(|e| tracing::warn!(error = %e, "Base URL is not a valid origin, CORS disabled"))
        .ok()?;

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
    )
}

/// Build the full application: routes, sessions, tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let cors = cors_layer(&state.config().base_url);

    let router = routes()
        .layer(session_layer)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Response, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn test_app() -> Router {
        app(AppState::new(crate::test_support::config()))
    }

    fn request(
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", "203.0.113.10");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn session_cookie(response: &Response<Body>) -> String {
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn scrubs(id: &str) -> Value {
        json!({
            "id": id,
            "sector": "healthcare",
            "garment_type": "scrubs",
            "size": "M",
            "quantity": 4,
            "unit_price": { "amount": "85.00", "currency_code": "SAR" }
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn test_new_visitor_has_empty_cart() {
        let response = test_app()
            .oneshot(request(Method::GET, "/cart", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["items"], json!([]));
        assert_eq!(body["item_count"], 0);
    }

    #[tokio::test]
    async fn test_cart_survives_across_requests() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/cart/items", None, Some(scrubs("a"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = session_cookie(&response);

        app.clone()
            .oneshot(request(Method::POST, "/cart/items", Some(&cookie), Some(scrubs("b"))))
            .await
            .unwrap();
        app.clone()
            .oneshot(request(Method::DELETE, "/cart/items/a", Some(&cookie), None))
            .await
            .unwrap();

        let response = app
            .oneshot(request(Method::GET, "/cart", Some(&cookie), None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["items"].as_array().unwrap().len(), 1);
        assert_eq!(body["items"][0]["id"], "b");
        assert_eq!(body["item_count"], 4);
        assert_eq!(body["subtotal_display"], "SAR 340.00");
    }

    #[tokio::test]
    async fn test_clear_cart() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request(Method::POST, "/cart/items", None, Some(scrubs("a"))))
            .await
            .unwrap();
        let cookie = session_cookie(&response);

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/cart", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app
            .oneshot(request(Method::GET, "/cart", Some(&cookie), None))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["items"], json!([]));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_bad_request() {
        let mut item = scrubs("a");
        item["quantity"] = json!(0);

        let response = test_app()
            .oneshot(request(Method::POST, "/cart/items", None, Some(item)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_out_of_range_items_are_bad_request() {
        let app = test_app();

        let mut overpriced = scrubs("a");
        overpriced["quantity"] = json!(2);
        overpriced["unit_price"]["amount"] = json!("79228162514264337593543950335");

        let mut bulk = scrubs("b");
        bulk["quantity"] = json!(4_000_000_000_u32);

        let mut negative = scrubs("c");
        negative["unit_price"]["amount"] = json!("-85.00");

        for item in [overpriced, bulk, negative] {
            let response = app
                .clone()
                .oneshot(request(Method::POST, "/cart/items", None, Some(item)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_checkout_keeps_upstream_request_id() {
        let body = json!({ "name": "Noura", "email": "noura@clinic.example" });
        let mut req = request(Method::POST, "/orders", None, Some(body));
        req.headers_mut().insert("x-request-id", HeaderValue::from_static("edge-42"));

        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["x-request-id"], "edge-42");
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_bad_request() {
        let body = json!({ "name": "Noura", "email": "noura@clinic.example" });
        let response = test_app()
            .oneshot(request(Method::POST, "/orders", None, Some(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Bad request: cart is empty");
    }

    #[tokio::test]
    async fn test_invalid_tracking_id_is_bad_request() {
        for id in ["yarn-ab12cd34", "YARN-AB12", "ORDER-AB12CD34", "YARN-AB12CD3!"] {
            let response = test_app()
                .oneshot(request(Method::GET, &format!("/track/{id}"), None, None))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{id}");
        }
    }

    #[tokio::test]
    async fn test_tracking_with_unreachable_backend_is_bad_gateway() {
        let response = test_app()
            .oneshot(request(Method::GET, "/track/YARN-AB12CD34", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(json_body(response).await["error"], "Order service unavailable");
    }

    #[tokio::test]
    async fn test_readiness_with_unreachable_backend() {
        let response = test_app()
            .oneshot(request(Method::GET, "/health/ready", None, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
