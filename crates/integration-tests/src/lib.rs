//! Integration test support for the RocketShoes cart.
//!
//! [`FakeBackend`] serves `/stock/{id}` and `/products/{id}` from memory on an
//! ephemeral local port, so the real [`ApiClient`](rocketshoes_cart::ApiClient)
//! can be exercised end to end without an external server.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_cart::ApiConfig;
use serde_json::{Value, json};
use tokio::task::JoinHandle;

/// In-memory stand-in for the RocketShoes backend API.
pub struct FakeBackend {
    base_url: String,
    state: Arc<BackendState>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct BackendState {
    stock: Mutex<HashMap<i32, i64>>,
    products: Mutex<HashMap<i32, Value>>,
    token: Option<String>,
    stock_status_override: AtomicU16,
    stock_hits: AtomicUsize,
    product_hits: AtomicUsize,
}

impl FakeBackend {
    /// Start a backend that accepts every request.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start() -> Self {
        Self::spawn(BackendState::default()).await
    }

    /// Start a backend that requires `Authorization: Bearer {token}`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start_with_token(token: &str) -> Self {
        Self::spawn(BackendState {
            token: Some(token.to_string()),
            ..BackendState::default()
        })
        .await
    }

    async fn spawn(state: BackendState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake backend stopped");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
            task,
        }
    }

    /// API client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected, which would be a bug in this harness.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.base_url).expect("Fake backend URL is valid")
    }

    /// Register a catalog product together with its stock.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the state lock.
    pub fn add_product(&self, id: i32, title: &str, price: f64, stock: u32) {
        self.state.products.lock().expect("products lock").insert(
            id,
            json!({
                "id": id,
                "title": title,
                "price": price,
                "image": format!("https://rocketseat-cdn.s3-sa-east-1.amazonaws.com/modulo-redux/tenis{id}.jpg"),
            }),
        );
        self.set_stock(id, i64::from(stock));
    }

    /// Change the stock of a product. Negative values model an oversold product.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the state lock.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.state.stock.lock().expect("stock lock").insert(id, amount);
    }

    /// Make every stock request answer with `status` (0 restores normal behaviour).
    pub fn fail_stock_with(&self, status: u16) {
        self.state.stock_status_override.store(status, Ordering::SeqCst);
    }

    /// Number of `/stock` requests served.
    #[must_use]
    pub fn stock_hits(&self) -> usize {
        self.state.stock_hits.load(Ordering::SeqCst)
    }

    /// Number of `/products` requests served.
    #[must_use]
    pub fn product_hits(&self) -> usize {
        self.state.product_hits.load(Ordering::SeqCst)
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn authorized(state: &BackendState, headers: &HeaderMap) -> bool {
    let Some(token) = &state.token else {
        return true;
    };
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {token}"))
}

async fn stock(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.stock_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let status_override = state.stock_status_override.load(Ordering::SeqCst);
    if status_override != 0 {
        let status = StatusCode::from_u16(status_override)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, "stock service unavailable").into_response();
    }

    let amount = state.stock.lock().expect("stock lock").get(&id).copied();
    match amount {
        Some(amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn product(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> Response {
    state.product_hits.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let product = state.products.lock().expect("products lock").get(&id).cloned();
    match product {
        Some(product) => Json(product).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}
