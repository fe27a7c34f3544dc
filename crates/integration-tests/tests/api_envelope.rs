//! Data-access calls against the fake backend.
//!
//! Every call answers with an envelope; these tests pin the HTTP shape of
//! each request and how failures are normalized.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use shopfront_client::api::ApiClient;
use shopfront_client::config::ApiConfig;
use shopfront_core::{
    Address, AddressId, OrderId, OrderStatus, PostalCode, Price, ProductId, Role, UserId,
};
use shopfront_integration_tests::{FakeBackend, Route};

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_list_products_is_cached() {
    let backend = FakeBackend::start().await;
    let api = backend.client();

    let first = api.list_products().await;
    assert!(first.success);
    assert_eq!(first.status, 200);
    let products = first.data.unwrap();
    assert_eq!(products.len(), 3);
    assert_eq!(products[1].price, Price::from_cents(550));

    let second = api.list_products().await;
    assert_eq!(second.data.unwrap().len(), 3);
    assert_eq!(backend.requests(), vec!["GET /products"]);

    api.invalidate_cache();
    api.list_products().await;
    assert_eq!(backend.requests().len(), 2);
}

#[tokio::test]
async fn test_find_product_not_found() {
    let backend = FakeBackend::start().await;
    let response = backend.client().find_product(ProductId::new(99)).await;

    assert!(!response.success);
    assert_eq!(response.status, 404);
    assert_eq!(response.message, "Could not load product.");
    assert!(response.data.is_none());
}

// =============================================================================
// Envelope normalization
// =============================================================================

#[tokio::test]
async fn test_transport_failure_reports_500() {
    // Bind then release a port so nothing listens on it.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = ApiConfig::new(&format!("http://{addr}/")).unwrap();
    let api = ApiClient::new(&config).unwrap();
    let response = api.find_my_orders().await;

    assert!(!response.success);
    assert_eq!(response.status, 500);
    assert_eq!(response.message, "Could not load the order history.");
}

#[tokio::test]
async fn test_server_message_reaches_caller_on_create() {
    let backend = FakeBackend::start().await;
    backend.fail_next(
        Route::CreateOrder,
        422,
        Some(json!({"message": "Product 3 is out of stock"})),
    );

    let api = backend.client();
    let request = shopfront_client::api::CreateOrderRequest {
        items: vec![shopfront_client::api::OrderLine {
            product_id: ProductId::new(3),
            price: Price::from_cents(3290),
            quantity: 1,
        }],
        address_id: None,
    };
    let response = api.create_order(&request).await;

    assert!(!response.success);
    assert_eq!(response.status, 422);
    assert_eq!(response.message, "Product 3 is out of stock");
}

#[tokio::test]
async fn test_fixed_message_without_server_message() {
    let backend = FakeBackend::start().await;
    backend.fail_next(Route::MyOrders, 503, None);

    let response = backend.client().find_my_orders().await;

    assert_eq!(response.status, 503);
    assert_eq!(response.message, "Could not load the order history.");
}

#[tokio::test]
async fn test_admin_calls_use_fixed_messages() {
    let backend = FakeBackend::start().await;
    backend.fail_next(Route::AllOrders, 403, Some(json!({"message": "Forbidden"})));

    let response = backend.client().find_all_orders().await;

    assert_eq!(response.status, 403);
    assert_eq!(response.message, "Could not load orders.");
}

#[tokio::test]
async fn test_bearer_token_is_sent() {
    let backend = FakeBackend::start().await;
    let mut config = backend.api_config();
    config.token = Some(SecretString::from("eyJhbGciOiJIUzI1NiJ9.c2hvcGZyb250"));
    let api = ApiClient::new(&config).unwrap();

    api.find_addresses().await;

    let recorded = backend.recorded();
    assert_eq!(
        recorded[0].authorization.as_deref(),
        Some("Bearer eyJhbGciOiJIUzI1NiJ9.c2hvcGZyb250")
    );
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_status_update_sends_json_string_literal() {
    let backend = FakeBackend::start().await;
    let api = backend.client();
    let request = shopfront_client::api::CreateOrderRequest {
        items: vec![shopfront_client::api::OrderLine {
            product_id: ProductId::new(1),
            price: Price::from_cents(1000),
            quantity: 2,
        }],
        address_id: None,
    };
    let order = api.create_order(&request).await.into_result().unwrap();
    assert_eq!(order.id, OrderId::new(42));
    assert_eq!(order.total(), Price::from_cents(2000));

    let updated = api.update_order_status(order.id, OrderStatus::Paid).await;

    assert!(updated.success);
    assert_eq!(updated.data.unwrap().status, OrderStatus::Paid);
    assert_eq!(backend.bodies()[1], json!("PAGO"));
    assert_eq!(backend.requests()[1], "PUT /orders/42/status");
}

#[tokio::test]
async fn test_order_address_assignment_path() {
    let backend = FakeBackend::start().await;
    let address_id = backend.add_address("Av. Paulista");
    let api = backend.client();
    let request = shopfront_client::api::CreateOrderRequest {
        items: vec![shopfront_client::api::OrderLine {
            product_id: ProductId::new(2),
            price: Price::from_cents(550),
            quantity: 1,
        }],
        address_id: None,
    };
    let order = api.create_order(&request).await.into_result().unwrap();

    let updated = api
        .update_order_address(order.id, AddressId::new(address_id))
        .await
        .into_result()
        .unwrap();

    assert!(updated.has_address());
    assert_eq!(
        backend.requests().last().map(String::as_str),
        Some(format!("PUT /orders/{}/address/{address_id}", order.id).as_str())
    );
}

// =============================================================================
// Addresses
// =============================================================================

#[tokio::test]
async fn test_save_address_posts_new_and_puts_existing() {
    let backend = FakeBackend::start().await;
    let api = backend.client();

    let mut address = Address {
        description: "Work".to_string(),
        zip_code: "20040-020".to_string(),
        street: "Rua da Assembleia".to_string(),
        number: "10".to_string(),
        neighborhood: "Centro".to_string(),
        city: "Rio de Janeiro".to_string(),
        state: "RJ".to_string(),
        ..Address::default()
    };

    let created = api.save_address(&address).await;
    assert_eq!(created.status, 201);
    let id = created.data.unwrap().id.unwrap();

    address.id = Some(id);
    address.number = "12".to_string();
    let updated = api.save_address(&address).await.into_result().unwrap();
    assert_eq!(updated.number, "12");

    let requests = backend.requests();
    assert_eq!(requests[0], "POST /address");
    assert_eq!(requests[1], format!("PUT /address/{id}"));
    assert!(backend.bodies()[0].get("id").is_none());
}

#[tokio::test]
async fn test_remove_address() {
    let backend = FakeBackend::start().await;
    let id = backend.add_address("Av. Paulista");
    let api = backend.client();

    let removed = api.remove_address(AddressId::new(id)).await;
    assert!(removed.success);
    assert_eq!(removed.status, 204);

    assert!(api.find_addresses().await.data.unwrap().is_empty());

    let again = api.remove_address(AddressId::new(id)).await;
    assert!(!again.success);
    assert_eq!(again.status, 404);
}

// =============================================================================
// Shipping and users
// =============================================================================

#[tokio::test]
async fn test_shipping_quote_query() {
    let backend = FakeBackend::start().await;
    let cep = PostalCode::parse("01310-100").unwrap();

    let response = backend.client().calculate_shipping(&cep).await;

    let options = response.data.unwrap();
    assert_eq!(options.len(), 2);
    assert_eq!(options[1].delivery_time, 2);
    assert_eq!(
        backend.requests(),
        vec!["GET /api/shipping/calculate?cep=01310100"]
    );
}

#[tokio::test]
async fn test_update_authorities_body() {
    let backend = FakeBackend::start().await;
    let api = backend.client();

    let users = api.find_users().await.into_result().unwrap();
    assert!(users[1].has_role(Role::Admin));

    let user = api
        .update_authorities(UserId::new(1), &[Role::Admin, Role::User])
        .await
        .into_result()
        .unwrap();

    assert_eq!(user.roles(), vec![Role::Admin, Role::User]);
    assert_eq!(
        backend.bodies()[0],
        json!([{"authority": "ROLE_ADMIN"}, {"authority": "ROLE_USER"}])
    );
}
