//! Integration tests for AnyCart.
//!
//! The tests drive the real client library against an in-process fake
//! backend: an axum router that mimics the endpoints the client consumes
//! and records what it saw (call counts, headers), bound to an ephemeral
//! port per test.
//!
//! # Test Categories
//!
//! - `token_refresh` - the one-shot refresh-and-retry contract
//! - `auth_flow` - login/registration establishing sessions
//! - `purchases` - list/detail/checkout/delete against the backend
//! - `cart_sync` - cross-process cart reconciliation
//!
//! Run with: `cargo test -p anycart-integration-tests`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};

use anycart_client::{ApiClient, ClientConfig, SessionStore, StorageDir};

/// Tokens the fake backend hands out.
pub const INITIAL_ACCESS: &str = "initial-access";
/// Refresh token accepted by the fake refresh endpoint.
pub const REFRESH_TOKEN: &str = "refresh-1";
/// Access token produced by a successful refresh.
pub const REFRESHED_ACCESS: &str = "refreshed-access";

/// Observable state of the fake backend.
pub struct BackendState {
    /// Number of calls to `GET /api/me/`.
    pub me_calls: AtomicUsize,
    /// Number of calls to `POST /api/token/refresh/`.
    pub refresh_calls: AtomicUsize,
    /// Whether the refresh endpoint succeeds.
    pub refresh_ok: AtomicBool,
    /// Whether a successful refresh actually validates the new token.
    /// When false, the retried request keeps 401ing.
    pub refresh_grants_valid: AtomicBool,
    /// The access token currently accepted by authenticated routes.
    pub valid_access: Mutex<String>,
    /// Delay before `GET /api/me/` answers, for cancellation tests.
    pub me_delay_ms: AtomicU64,
    /// Idempotency-Key header captured from the last create-purchase call.
    pub last_idempotency_key: Mutex<Option<String>>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            me_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            refresh_ok: AtomicBool::new(true),
            refresh_grants_valid: AtomicBool::new(true),
            valid_access: Mutex::new(INITIAL_ACCESS.to_owned()),
            me_delay_ms: AtomicU64::new(0),
            last_idempotency_key: Mutex::new(None),
        }
    }
}

impl BackendState {
    fn accepts(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }
}

/// A running fake backend plus a client wired to it over a temp data dir.
pub struct TestContext {
    /// Base URL of the fake backend.
    pub base_url: String,
    /// Observable backend state.
    pub state: Arc<BackendState>,
    /// Storage directory backing the stores.
    pub storage: StorageDir,
    /// Session store shared with the client.
    pub session: SessionStore,
    /// The client under test.
    pub client: ApiClient,
    _data_dir: tempfile::TempDir,
}

impl TestContext {
    /// Spawn a fake backend and build a client against it.
    pub async fn new() -> Self {
        let state = Arc::new(BackendState::default());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let data_dir = tempfile::tempdir().expect("Failed to create temp data dir");
        let storage = StorageDir::new(data_dir.path().to_path_buf());
        let session = SessionStore::new(storage.clone());
        let base_url = format!("http://{addr}");
        let config = ClientConfig {
            api_base: base_url.clone(),
            google_client_id: None,
            data_dir: data_dir.path().to_path_buf(),
        };
        let client =
            ApiClient::new(&config, session.clone()).expect("Failed to build ApiClient");

        Self {
            base_url,
            state,
            storage,
            session,
            client,
            _data_dir: data_dir,
        }
    }

    /// Store a session whose access token the backend currently accepts.
    pub fn seed_valid_session(&self) {
        self.session.set(&anycart_client::Session::from_tokens(
            INITIAL_ACCESS.to_owned(),
            REFRESH_TOKEN.to_owned(),
        ));
    }

    /// Store a session whose access token the backend rejects, so the
    /// first authenticated call 401s.
    pub fn seed_stale_session(&self) {
        self.session.set(&anycart_client::Session::from_tokens(
            "stale-access".to_owned(),
            REFRESH_TOKEN.to_owned(),
        ));
    }
}

/// A syntactically valid JWT carrying `payload` (unsigned, test-only).
pub fn make_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"none\"}");
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.")
}

/// Poll `probe` every 50ms until it returns true or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut probe: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if probe() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    probe()
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/token/", post(token))
        .route("/api/token/refresh/", post(refresh))
        .route("/api/me/", get(me))
        .route("/api/purchases/", get(list_purchases).post(create_purchase))
        .route(
            "/api/purchases/{id}/",
            get(get_purchase).delete(delete_purchase),
        )
        .with_state(state)
}

async fn token(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    if body.get("username").is_none() || body.get("password").is_none() {
        return (StatusCode::BAD_REQUEST, "missing credentials").into_response();
    }
    let access = make_token(&json!({ "user_id": 7 }));
    // The freshly issued token is what authenticated routes accept now.
    *state.valid_access.lock().unwrap() = access.clone();
    Json(json!({ "access": access, "refresh": REFRESH_TOKEN })).into_response()
}

async fn refresh(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if !state.refresh_ok.load(Ordering::SeqCst) {
        return (StatusCode::UNAUTHORIZED, "refresh rejected").into_response();
    }
    if body.get("refresh").and_then(Value::as_str) != Some(REFRESH_TOKEN) {
        return (StatusCode::UNAUTHORIZED, "unknown refresh token").into_response();
    }

    if state.refresh_grants_valid.load(Ordering::SeqCst) {
        *state.valid_access.lock().unwrap() = REFRESHED_ACCESS.to_owned();
    }
    Json(json!({ "access": REFRESHED_ACCESS })).into_response()
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.me_calls.fetch_add(1, Ordering::SeqCst);

    let delay = state.me_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    if !state.accepts(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    Json(json!({
        "id": 7,
        "email": "ada@example.com",
        "first_name": "Ada",
        "last_name": "Lovelace",
        "avatar_url": null,
        "is_staff": false,
        "email_confirmed": true
    }))
    .into_response()
}

fn purchase_json(id: &str, with_items: bool, with_total: bool) -> Value {
    let mut purchase = json!({
        "id": id,
        "cart_name": "Groceries",
        "completed_at": "2025-11-02T10:30:00Z",
        "store_name": "Corner Shop",
        "currency": "EUR",
        "notes": "",
        "tags": null,
        "items_count": 2,
        "idempotency_key": null
    });
    if with_total {
        purchase["total_amount"] = json!("3.27");
    }
    if with_items {
        purchase["items"] = json!([
            { "name": "Milk", "unit_price": "0.89", "quantity": 2,
              "created_at": "2025-11-02T10:30:00Z" },
            { "name": "Bread", "unit_price": "1.49", "quantity": 1,
              "created_at": "2025-11-02T10:30:00Z" }
        ]);
    }
    purchase
}

async fn list_purchases(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if !state.accepts(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    // Page envelope plus one malformed record the client must drop.
    Json(json!({
        "count": 3,
        "results": [
            purchase_json("p-1", false, true),
            purchase_json("p-2", false, true),
            { "unexpected": true }
        ]
    }))
    .into_response()
}

async fn get_purchase(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.accepts(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "no such purchase").into_response();
    }
    // Detail payload without a server total: the client must recompute.
    Json(purchase_json(&id, true, false)).into_response()
}

async fn create_purchase(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.accepts(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    let key = headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *state.last_idempotency_key.lock().unwrap() = key;

    let mut purchase = purchase_json("p-created", false, true);
    for field in ["cart_name", "store_name", "currency"] {
        if let Some(value) = body.get(field) {
            purchase[field] = value.clone();
        }
    }
    (StatusCode::CREATED, Json(purchase)).into_response()
}

async fn delete_purchase(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !state.accepts(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }
    if id == "missing" {
        return (StatusCode::NOT_FOUND, "no such purchase").into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}
