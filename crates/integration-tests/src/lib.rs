//! Integration test support for the Jacarandá client SDK.
//!
//! Provides [`MockShop`], an in-process axum rendition of the shop backend
//! with just enough behavior to exercise the client: cookie-based access
//! credentials, a renewal endpoint with controllable delay and failure, a
//! small catalog fixture, and protected order endpoints.
//!
//! The credential model mirrors the real backend: login and refresh set an
//! HTTP-only `access` cookie; protected endpoints 401 unless the cookie
//! matches the current token generation. Tests expire every outstanding
//! credential by bumping the generation via [`MockState::invalidate_sessions`].

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Once};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use jacaranda_client::{ClientConfig, MemoryStorage, Shop, Storage};

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber, once per process.
///
/// Controlled by `RUST_LOG`; output goes through the test writer so it is
/// captured per test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Shared, test-controllable backend state.
#[derive(Debug, Default)]
pub struct MockState {
    /// Current token generation; cookies from older generations are invalid.
    token_serial: AtomicU64,
    /// Number of calls made to `POST /auth/refresh`.
    pub refresh_calls: AtomicUsize,
    /// Number of orders accepted by `POST /orders`.
    pub orders_placed: AtomicUsize,
    refresh_fails: AtomicBool,
    refresh_delay_ms: AtomicU64,
}

impl MockState {
    fn current_token(&self) -> String {
        format!("tok-{}", self.token_serial.load(Ordering::SeqCst))
    }

    fn rotate_token(&self) -> String {
        self.token_serial.fetch_add(1, Ordering::SeqCst);
        self.current_token()
    }

    /// Invalidate every credential cookie issued so far. The next
    /// authenticated call will 401 and force the client through a renewal.
    pub fn invalidate_sessions(&self) {
        self.token_serial.fetch_add(1, Ordering::SeqCst);
    }

    /// Make the renewal endpoint answer 401 from now on.
    pub fn fail_refreshes(&self) {
        self.refresh_fails.store(true, Ordering::SeqCst);
    }

    /// Delay renewal responses, widening the window in which concurrent
    /// 401s pile up behind a single in-flight refresh.
    pub fn set_refresh_delay(&self, delay: Duration) {
        self.refresh_delay_ms
            .store(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX), Ordering::SeqCst);
    }
}

/// An in-process mock of the shop backend.
pub struct MockShop {
    pub state: Arc<MockState>,
    pub base_url: String,
    server: tokio::task::JoinHandle<()>,
}

impl MockShop {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn spawn() -> Self {
        init_tracing();
        let state = Arc::new(MockState::default());
        let app = router(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");
        tracing::debug!(%addr, "mock backend listening");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve mock backend");
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
            server,
        }
    }

    /// Client configuration pointing at this mock.
    ///
    /// # Panics
    ///
    /// Panics if the mock's own base URL fails to parse.
    #[must_use]
    pub fn config(&self, storage_dir: impl Into<std::path::PathBuf>) -> ClientConfig {
        ClientConfig::new(
            self.base_url.parse().expect("mock base url"),
            storage_dir.into(),
        )
    }

    /// A fully wired [`Shop`] with in-memory storage.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be constructed.
    #[must_use]
    pub fn shop(&self) -> Shop {
        self.shop_with_storage(Arc::new(MemoryStorage::new()))
    }

    /// A fully wired [`Shop`] over caller-provided storage.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be constructed.
    #[must_use]
    pub fn shop_with_storage(&self, storage: Arc<dyn Storage>) -> Shop {
        Shop::with_storage(&self.config(std::env::temp_dir()), storage).expect("wire shop")
    }
}

impl Drop for MockShop {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Router and handlers
// =============================================================================

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
        .route("/users", post(register))
        .route("/products", get(list_products))
        .route("/products/{slug}", get(product_by_slug))
        .route("/variants/product/{product_id}", get(variants_for_product))
        .route("/categories", get(list_categories))
        .route("/orders", get(order_history).post(place_order))
        .route("/dashboard/stats", get(dashboard_stats))
        .with_state(state)
}

fn access_cookie(token: &str) -> (header::HeaderName, String) {
    (
        header::SET_COOKIE,
        format!("access={token}; Path=/; HttpOnly"),
    )
}

fn is_authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let expected = format!("access={}", state.current_token());
    headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|cookies| cookies.split(';').any(|pair| pair.trim() == expected))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized"})),
    )
        .into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or("user@example.com");
    if body["password"].as_str().unwrap_or_default() == "wrong" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response();
    }

    let local = email.split('@').next().unwrap_or("user");
    let token = state.current_token();
    let user = json!({
        "id": format!("u-{local}"),
        "email": email,
        "firstName": local,
        "lastName": "Test",
        "isAdmin": local == "admin",
    });

    (
        [access_cookie(&token)],
        Json(json!({"accessToken": token, "user": user})),
    )
        .into_response()
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

async fn refresh(State(state): State<Arc<MockState>>) -> Response {
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.refresh_fails.load(Ordering::SeqCst) {
        return unauthorized();
    }

    let token = state.rotate_token();
    ([access_cookie(&token)], StatusCode::OK).into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"].as_str().is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "email is required"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "User created successfully"})),
    )
        .into_response()
}

async fn list_products() -> Json<Value> {
    Json(json!([product_linen_shirt(), product_straw_hat()]))
}

async fn product_by_slug(Path(slug): Path<String>) -> Response {
    if slug == "linen-shirt" {
        let mut detail = product_linen_shirt();
        detail["variants"] = json!(linen_shirt_variants());
        return Json(detail).into_response();
    }
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Product not found"})),
    )
        .into_response()
}

async fn variants_for_product(Path(product_id): Path<String>) -> Response {
    if product_id == "p-1" {
        return Json(json!(linen_shirt_variants())).into_response();
    }
    Json(json!([])).into_response()
}

async fn list_categories() -> Json<Value> {
    Json(json!([
        {"id": "c-1", "name": "Shirts", "description": "Linen and cotton"},
        {"id": "c-2", "name": "Accessories"},
    ]))
}

async fn order_history(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!([{
        "id": "o-7",
        "createdAt": "2026-02-01T09:30:00Z",
        "totalPrice": "149.90",
        "status": "SHIPPED",
        "paymentStatus": "PAID",
        "items": [{
            "id": "oi-1",
            "orderId": "o-7",
            "productId": "p-1",
            "variantId": "v-1",
            "quantity": 1,
        }],
        "shippingAddress": {"street": "Rua das Flores 10", "city": "Campinas"},
    }]))
    .into_response()
}

async fn place_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    let items = body["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "order must contain at least one item"})),
        )
            .into_response();
    }

    state.orders_placed.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({
            "id": "o-1",
            "createdAt": "2026-02-10T15:00:00Z",
            "totalPrice": "149.90",
            "status": "PENDING",
            "paymentStatus": "PENDING",
            "items": [],
            "shippingAddress": body["shippingAddress"],
        })),
    )
        .into_response()
}

async fn dashboard_stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !is_authorized(&state, &headers) {
        return unauthorized();
    }
    Json(json!({
        "totalProducts": 2,
        "totalVariants": 2,
        "featuredProducts": 1,
        "availableProducts": 2,
        "totalViews": 420,
        "totalSales": 12,
        "totalRevenue": "1798.80",
        "averageOrderValue": "149.90",
        "conversionRate": 0.028,
        "topProducts": [
            {"id": "p-1", "name": "Linen Shirt", "sales": 9, "revenue": "1349.10", "views": 310}
        ],
        "lowStockProducts": [
            {"id": "p-1", "name": "Linen Shirt", "variant": "sand / M", "stock": 4}
        ],
        "salesByMonth": [
            {"month": "2026-01", "sales": 5, "revenue": "749.50"},
            {"month": "2026-02", "sales": 7, "revenue": "1049.30"}
        ],
        "productsByCategory": [
            {"category": "Shirts", "count": 1, "color": "#8884d8"},
            {"category": "Accessories", "count": 1, "color": "#82ca9d"}
        ],
    }))
    .into_response()
}

// =============================================================================
// Catalog fixtures
// =============================================================================

fn product_linen_shirt() -> Value {
    json!({
        "id": "p-1",
        "name": "Linen Shirt",
        "description": "Relaxed-fit shirt in washed linen.",
        "slug": "linen-shirt",
        "price": 149.90,
        "wholesale": 119.90,
        "details": ["100% washed linen", "Relaxed fit"],
        "mainImageUrl": ["https://img.example/linen-shirt.jpg"],
        "isFeatured": true,
        "isAvailable": true,
        "categoryId": "c-1",
        "color": "sand",
        "createdAt": "2026-01-10T12:00:00Z",
        "updatedAt": "2026-01-10T12:00:00Z",
    })
}

fn product_straw_hat() -> Value {
    json!({
        "id": "p-2",
        "name": "Straw Hat",
        "slug": "straw-hat",
        "price": 89.00,
        "mainImageUrl": [],
        "isFeatured": false,
        "isAvailable": true,
        "categoryId": "c-2",
        "createdAt": "2026-01-12T12:00:00Z",
        "updatedAt": "2026-01-12T12:00:00Z",
    })
}

fn linen_shirt_variants() -> Vec<Value> {
    vec![
        json!({
            "id": "v-1",
            "productId": "p-1",
            "size": "M",
            "color": "sand",
            "sku": "LS-M-SAND",
            "stock": 4,
            "additionalPrice": 0,
            "imageUrls": ["https://img.example/linen-shirt-sand.jpg"],
            "createdAt": "2026-01-10T12:00:00Z",
            "updatedAt": "2026-01-10T12:00:00Z",
        }),
        json!({
            "id": "v-2",
            "productId": "p-1",
            "size": "L",
            "color": "clay",
            "sku": "LS-L-CLAY",
            "stock": 2,
            "additionalPrice": 10.00,
            "imageUrls": [],
            "createdAt": "2026-01-10T12:00:00Z",
            "updatedAt": "2026-01-10T12:00:00Z",
        }),
    ]
}
