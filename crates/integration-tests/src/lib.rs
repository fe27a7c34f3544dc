//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `api_envelope` - data-access calls and envelope normalization over HTTP
//! - `checkout_flow` - the checkout sequence against the fake backend with a
//!   file-backed cart
//!
//! [`FakeBackend`] serves the storefront REST routes from memory on an
//! ephemeral port, records every request, and can be told to fail a route
//! once.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use shopfront_client::api::ApiClient;
use shopfront_client::config::ApiConfig;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Routes whose next call can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Products,
    Product,
    CreateOrder,
    MyOrders,
    AllOrders,
    Order,
    OrderStatus,
    OrderAddress,
    Addresses,
    SaveAddress,
    RemoveAddress,
    Shipping,
    Users,
    Authorities,
}

/// One request as seen by the backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    /// `"PUT /orders/42/status"`, query string included.
    pub line: String,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct BackendState {
    requests: Mutex<Vec<Recorded>>,
    bodies: Mutex<Vec<Value>>,
    failures: Mutex<HashMap<Route, (StatusCode, Option<Value>)>>,
    orders: Mutex<HashMap<i64, Value>>,
    addresses: Mutex<Vec<Value>>,
    next_id: Mutex<i64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl BackendState {
    fn take_failure(&self, route: Route) -> Option<Response> {
        let (status, body) = lock(&self.failures).remove(&route)?;
        Some(match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        })
    }

    fn record_body(&self, body: Value) {
        lock(&self.bodies).push(body);
    }

    fn next_id(&self) -> i64 {
        let mut next = lock(&self.next_id);
        *next += 1;
        *next
    }
}

/// A storefront backend held in memory.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Arc<BackendState>,
    handle: JoinHandle<()>,
}

impl FakeBackend {
    /// Start serving on `127.0.0.1` with an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            // Orders created here start at 42.
            next_id: Mutex::new(41),
            ..BackendState::default()
        });

        let app = Router::new()
            .route("/products", get(list_products))
            .route("/products/{id}", get(find_product))
            .route("/orders", get(all_orders).post(create_order))
            .route("/orders/my-orders", get(my_orders))
            .route("/orders/{id}", get(find_order))
            .route("/orders/{id}/status", put(update_status))
            .route("/orders/{id}/address/{address_id}", put(update_address))
            .route("/address", get(list_addresses).post(create_address))
            .route(
                "/address/{id}",
                get(find_address).put(replace_address).delete(remove_address),
            )
            .route("/api/shipping/calculate", get(calculate_shipping))
            .route("/users", get(list_users))
            .route("/users/{id}/authorities", put(update_authorities))
            .layer(middleware::from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("Failed to bind fake backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("Fake backend has no address: {e}"));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the backend, with a trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client settings pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the URL is rejected, which would be a bug in the fixture.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.url()).unwrap_or_else(|e| panic!("Bad fake backend URL: {e}"))
    }

    /// A client for this backend.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.api_config()).unwrap_or_else(|e| panic!("Bad client: {e}"))
    }

    /// Fail the next call to `route` with `status` and an optional JSON body.
    pub fn fail_next(&self, route: Route, status: u16, body: Option<Value>) {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        lock(&self.state.failures).insert(route, (status, body));
    }

    /// Register an address in the address book; returns its id.
    pub fn add_address(&self, street: &str) -> i64 {
        let id = self.state.next_id();
        lock(&self.state.addresses).push(address_json(id, street));
        id
    }

    /// Every request line received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state.requests)
            .iter()
            .map(|r| r.line.clone())
            .collect()
    }

    /// Every request received so far, with headers of interest.
    #[must_use]
    pub fn recorded(&self) -> Vec<Recorded> {
        lock(&self.state.requests).clone()
    }

    /// JSON bodies received so far, in order.
    #[must_use]
    pub fn bodies(&self) -> Vec<Value> {
        lock(&self.state.bodies).clone()
    }

    /// The stored copy of an order.
    #[must_use]
    pub fn order(&self, id: i64) -> Option<Value> {
        lock(&self.state.orders).get(&id).cloned()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Catalog entry `id` as served by the fake backend.
#[must_use]
pub fn product_json(id: i64) -> Value {
    let (name, price) = match id {
        1 => ("Espresso beans", 10.0),
        2 => ("Paper filters", 5.5),
        _ => ("Mug", 32.9),
    };
    json!({
        "id": id,
        "name": name,
        "description": "",
        "price": price,
        "urlImage": format!("https://img.example.com/{id}.png"),
        "category": {"id": 1, "name": "Coffee"}
    })
}

fn address_json(id: i64, street: &str) -> Value {
    json!({
        "id": id,
        "description": "Home",
        "zipCode": "01310-100",
        "street": street,
        "number": "1000",
        "neighborhood": "Bela Vista",
        "city": "São Paulo",
        "state": "SP"
    })
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({"message": "Not found"}))).into_response()
}

async fn record(
    State(state): State<Arc<BackendState>>,
    request: Request,
    next: Next,
) -> Response {
    let uri = request.uri();
    let line = match uri.query() {
        Some(query) => format!("{} {}?{query}", request.method(), uri.path()),
        None => format!("{} {}", request.method(), uri.path()),
    };
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    lock(&state.requests).push(Recorded {
        line,
        authorization,
    });
    next.run(request).await
}

async fn list_products(State(state): State<Arc<BackendState>>) -> Response {
    if let Some(failure) = state.take_failure(Route::Products) {
        return failure;
    }
    Json(json!([product_json(1), product_json(2), product_json(3)])).into_response()
}

async fn find_product(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    if let Some(failure) = state.take_failure(Route::Product) {
        return failure;
    }
    if (1..=3).contains(&id) {
        Json(product_json(id)).into_response()
    } else {
        not_found()
    }
}

async fn create_order(State(state): State<Arc<BackendState>>, Json(body): Json<Value>) -> Response {
    state.record_body(body.clone());
    if let Some(failure) = state.take_failure(Route::CreateOrder) {
        return failure;
    }

    let items = body["items"].as_array().cloned().unwrap_or_default();
    if items.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Cart is empty"}))).into_response();
    }

    let id = state.next_id();
    let order = json!({
        "id": id,
        "date": "2024-05-01T10:00:00",
        "status": "PENDENTE",
        "user": {"id": 1, "username": "ana"},
        "items": items,
    });
    lock(&state.orders).insert(id, order.clone());
    (StatusCode::CREATED, Json(order)).into_response()
}

async fn my_orders(State(state): State<Arc<BackendState>>) -> Response {
    if let Some(failure) = state.take_failure(Route::MyOrders) {
        return failure;
    }
    let mut orders: Vec<Value> = lock(&state.orders).values().cloned().collect();
    orders.sort_by_key(|order| order["id"].as_i64());
    Json(orders).into_response()
}

async fn all_orders(State(state): State<Arc<BackendState>>) -> Response {
    if let Some(failure) = state.take_failure(Route::AllOrders) {
        return failure;
    }
    let mut orders: Vec<Value> = lock(&state.orders).values().cloned().collect();
    orders.sort_by_key(|order| order["id"].as_i64());
    Json(orders).into_response()
}

async fn find_order(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    if let Some(failure) = state.take_failure(Route::Order) {
        return failure;
    }
    lock(&state.orders)
        .get(&id)
        .map_or_else(not_found, |order| Json(order.clone()).into_response())
}

async fn update_status(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    Json(status): Json<String>,
) -> Response {
    state.record_body(Value::String(status.clone()));
    if let Some(failure) = state.take_failure(Route::OrderStatus) {
        return failure;
    }
    let mut orders = lock(&state.orders);
    let Some(order) = orders.get_mut(&id) else {
        return not_found();
    };
    order["status"] = Value::String(status);
    Json(order.clone()).into_response()
}

async fn update_address(
    State(state): State<Arc<BackendState>>,
    Path((id, address_id)): Path<(i64, i64)>,
) -> Response {
    if let Some(failure) = state.take_failure(Route::OrderAddress) {
        return failure;
    }
    let known = lock(&state.addresses)
        .iter()
        .any(|address| address["id"].as_i64() == Some(address_id));
    if !known {
        return not_found();
    }
    let mut orders = lock(&state.orders);
    let Some(order) = orders.get_mut(&id) else {
        return not_found();
    };
    order["address"] = json!(address_id);
    Json(order.clone()).into_response()
}

async fn list_addresses(State(state): State<Arc<BackendState>>) -> Response {
    if let Some(failure) = state.take_failure(Route::Addresses) {
        return failure;
    }
    Json(lock(&state.addresses).clone()).into_response()
}

async fn find_address(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    lock(&state.addresses)
        .iter()
        .find(|address| address["id"].as_i64() == Some(id))
        .map_or_else(not_found, |address| Json(address.clone()).into_response())
}

async fn create_address(
    State(state): State<Arc<BackendState>>,
    Json(mut body): Json<Value>,
) -> Response {
    state.record_body(body.clone());
    if let Some(failure) = state.take_failure(Route::SaveAddress) {
        return failure;
    }
    body["id"] = json!(state.next_id());
    lock(&state.addresses).push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn replace_address(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.record_body(body.clone());
    if let Some(failure) = state.take_failure(Route::SaveAddress) {
        return failure;
    }
    let mut addresses = lock(&state.addresses);
    let Some(stored) = addresses
        .iter_mut()
        .find(|address| address["id"].as_i64() == Some(id))
    else {
        return not_found();
    };
    *stored = body;
    Json(stored.clone()).into_response()
}

async fn remove_address(State(state): State<Arc<BackendState>>, Path(id): Path<i64>) -> Response {
    if let Some(failure) = state.take_failure(Route::RemoveAddress) {
        return failure;
    }
    let mut addresses = lock(&state.addresses);
    let before = addresses.len();
    addresses.retain(|address| address["id"].as_i64() != Some(id));
    if addresses.len() == before {
        not_found()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[derive(Deserialize)]
struct ShippingQuery {
    cep: String,
}

async fn calculate_shipping(
    State(state): State<Arc<BackendState>>,
    Query(query): Query<ShippingQuery>,
) -> Response {
    if let Some(failure) = state.take_failure(Route::Shipping) {
        return failure;
    }
    if query.cep.len() != 8 {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "Invalid CEP"}))).into_response();
    }
    Json(json!([
        {"id": 1, "name": "PAC", "price": 18.9, "deliveryTime": 7},
        {"id": 2, "name": "SEDEX", "price": 32.5, "deliveryTime": 2}
    ]))
    .into_response()
}

async fn list_users(State(state): State<Arc<BackendState>>) -> Response {
    if let Some(failure) = state.take_failure(Route::Users) {
        return failure;
    }
    Json(json!([
        {"id": 1, "name": "Ana", "username": "ana", "email": "ana@example.com",
         "authorities": [{"authority": "ROLE_USER"}]},
        {"id": 2, "name": "Bruno", "username": "bruno", "email": "bruno@example.com",
         "authorities": [{"authority": "ROLE_ADMIN"}, {"authority": "ROLE_USER"}]}
    ]))
    .into_response()
}

async fn update_authorities(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    state.record_body(body.clone());
    if let Some(failure) = state.take_failure(Route::Authorities) {
        return failure;
    }
    Json(json!({
        "id": id,
        "name": "Ana",
        "username": "ana",
        "email": "ana@example.com",
        "authorities": body
    }))
    .into_response()
}
