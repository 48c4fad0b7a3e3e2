//! Integration tests for the Yarn storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p yarn-integration-tests
//! ```
//!
//! Nothing external is needed: [`MockDocumentStore`] serves the subset of
//! the document store REST API the storefront uses, and [`TestContext`]
//! runs the real storefront router against it on a local port.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use yarn_storefront::config::{BackendConfig, StorefrontConfig};
use yarn_storefront::state::AppState;

const PROJECT: &str = "yarn-it";
const COLLECTION: &str = "orders";
const READ_TIME: &str = "2026-01-01T00:00:00Z";

#[derive(Default)]
struct MockState {
    /// Stored documents' `fields`, in write order.
    documents: Vec<Value>,
    /// Answer every request with 503.
    unavailable: bool,
    queries: usize,
}

/// In-process stand-in for the remote document store.
#[derive(Clone, Default)]
pub struct MockDocumentStore {
    state: Arc<Mutex<MockState>>,
}

impl MockDocumentStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a minimal order document carrying `order_id`.
    pub fn insert_order_id(&self, order_id: &str) {
        self.lock().documents.push(json!({
            "orderId": { "stringValue": order_id }
        }));
    }

    /// Make every request fail with 503.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of `runQuery` calls served.
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.lock().queries
    }

    /// `orderId` of every stored document.
    #[must_use]
    pub fn order_ids(&self) -> Vec<String> {
        self.lock()
            .documents
            .iter()
            .filter_map(|fields| fields["orderId"]["stringValue"].as_str().map(String::from))
            .collect()
    }

    /// Serve the mock on a random local port, returning the REST root
    /// (the equivalent of `BACKEND_BASE_URL`).
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route(
                "/v1/projects/{project}/databases/{database}/documents:runQuery",
                post(run_query),
            )
            .route(
                "/v1/projects/{project}/databases/{database}/documents/{collection}",
                post(create_document).get(list_documents),
            )
            .with_state(self.clone());

        let addr = serve(router).await;
        format!("http://{addr}/v1")
    }
}

fn unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": { "code": 503, "status": "UNAVAILABLE" } })),
    )
        .into_response()
}

async fn run_query(State(store): State<MockDocumentStore>, Json(body): Json<Value>) -> Response {
    let mut state = store.lock();
    if state.unavailable {
        return unavailable();
    }
    state.queries += 1;

    let filter = &body["structuredQuery"]["where"]["fieldFilter"];
    let field = filter["field"]["fieldPath"].as_str().unwrap_or_default();
    let wanted = &filter["value"];

    let found = state
        .documents
        .iter()
        .enumerate()
        .find(|(_, fields)| &fields[field] == wanted);

    let results = match found {
        Some((index, fields)) => json!([{
            "document": {
                "name": format!("projects/{PROJECT}/databases/(default)/documents/{COLLECTION}/doc{index}"),
                "fields": fields,
                "createTime": READ_TIME,
            },
            "readTime": READ_TIME,
        }]),
        None => json!([{ "readTime": READ_TIME }]),
    };

    Json(results).into_response()
}

async fn create_document(
    State(store): State<MockDocumentStore>,
    Path((_project, _database, collection)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = store.lock();
    if state.unavailable {
        return unavailable();
    }

    let fields = body["fields"].clone();
    let index = state.documents.len();
    state.documents.push(fields.clone());

    Json(json!({
        "name": format!("projects/{PROJECT}/databases/(default)/documents/{collection}/doc{index}"),
        "fields": fields,
        "createTime": READ_TIME,
    }))
    .into_response()
}

async fn list_documents(State(store): State<MockDocumentStore>) -> Response {
    if store.lock().unavailable {
        return unavailable();
    }
    Json(json!({ "documents": [] })).into_response()
}

/// Bind a random local port and serve `router` in the background.
async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap_or_else(|e| panic!("bind test listener: {e}"));
    let addr = listener
        .local_addr()
        .unwrap_or_else(|e| panic!("test listener address: {e}"));

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap_or_else(|e| panic!("test server: {e}"));
    });

    addr
}

/// Backend configuration pointing at a mock REST root.
#[must_use]
pub fn backend_config(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        project_id: PROJECT.to_string(),
        api_key: SecretString::from("integration-test-key"),
        orders_collection: COLLECTION.to_string(),
    }
}

/// Storefront configuration pointing at a mock REST root.
#[must_use]
pub fn storefront_config(backend_base_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("k3Jx9!pQ2#vL7@wR4$mN8^tB1&zY6*hC"),
        backend: backend_config(backend_base_url),
        email: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running storefront wired to a mock document store.
pub struct TestContext {
    /// Cookie-keeping client, so requests share one visitor session.
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub store: MockDocumentStore,
}

impl TestContext {
    /// Start a mock document store and a storefront in front of it.
    ///
    /// # Panics
    ///
    /// Panics if a local port cannot be bound or the client cannot be built.
    pub async fn new() -> Self {
        let store = MockDocumentStore::default();
        let backend_url = store.spawn().await;

        let state = AppState::new(storefront_config(&backend_url));
        let addr = serve(yarn_storefront::routes::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| panic!("build test client: {e}"));

        Self {
            client,
            storefront_url: format!("http://{addr}"),
            store,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }
}
