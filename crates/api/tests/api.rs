//! End-to-end API tests over the in-memory store.
//!
//! Each test builds a fresh router and drives it with `tower::ServiceExt::oneshot`,
//! covering the full login flow, session enforcement, catalog filters, orders,
//! and the admin surface.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use luxe_scent_api::config::{ApiConfig, StoreBackend};
use luxe_scent_api::db::Store;
use luxe_scent_api::db::memory::MemoryStore;
use luxe_scent_api::routes;
use luxe_scent_api::services::mailer::{LogMailer, Mailer};
use luxe_scent_api::services::token::{SESSION_VALIDITY, TokenSigner};
use luxe_scent_api::state::AppState;
use luxe_scent_core::{Email, UserId};

const JWT_SECRET: &str = "k9mQ2xR7vT4wZ8nB3cF6hJ1pL5sD0gA9-integration";

fn test_config() -> ApiConfig {
    ApiConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        store: StoreBackend::Memory,
        jwt_secret: SecretString::from(JWT_SECRET),
        mail: None,
        sentry_dsn: None,
    }
}

fn test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(
        test_config(),
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::new(LogMailer) as Arc<dyn Mailer>,
    );
    (routes::app(state), store)
}

fn post_json(uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    request_with_json("POST", uri, body, token)
}

fn request_with_json(method: &str, uri: &str, body: &Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn stored_code(store: &MemoryStore, email: &str) -> String {
    store
        .user_by_email(&Email::parse(email).unwrap())
        .await
        .unwrap()
        .unwrap()
        .otp_code
        .unwrap()
        .as_str()
        .to_owned()
}

/// Run the full login flow and return (token, user id).
async fn login(app: &Router, store: &MemoryStore, email: &str) -> (String, UserId) {
    let (status, _) = send(app, post_json("/api/auth/login", &json!({"email": email}), None)).await;
    assert_eq!(status, StatusCode::OK);

    let code = stored_code(store, email).await;
    let (status, body) = send(
        app,
        post_json("/api/auth/verify", &json!({"email": email, "otp": code}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap().to_owned();
    let id = UserId::new(i32::try_from(body["user"]["id"].as_i64().unwrap()).unwrap());
    (token, id)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let (app, _) = test_app();

    let response = app.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health/ready", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Login flow
// =============================================================================

#[tokio::test]
async fn test_full_login_flow() {
    let (app, store) = test_app();

    let (status, body) = send(
        &app,
        post_json("/api/auth/login", &json!({"email": "shopper@example.com"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("code"));

    // A six-digit code is now outstanding.
    let code = stored_code(&store, "shopper@example.com").await;
    assert_eq!(code.len(), 6);
    assert!(code.bytes().all(|b| b.is_ascii_digit()));

    // Wrong code fails without consuming the real one.
    let wrong = if code == "123456" { "654321" } else { "123456" };
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/verify",
            &json!({"email": "shopper@example.com", "otp": wrong}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Right code yields a token and the profile.
    let (status, body) = send(
        &app,
        post_json(
            "/api/auth/verify",
            &json!({"email": "shopper@example.com", "otp": code}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "shopper@example.com");
    assert_eq!(body["user"]["isAdmin"], false);

    // The token opens the account surface.
    let token = body["token"].as_str().unwrap();
    let (status, body) = send(&app, get("/api/users/me", Some(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "shopper@example.com");
}

#[tokio::test]
async fn test_login_requires_email() {
    let (app, _) = test_app();
    let (status, _) = send(&app, post_json("/api/auth/login", &json!({}), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_requires_both_fields() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        post_json("/api/auth/verify", &json!({"email": "a@x.com"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_unknown_email_is_404() {
    let (app, _) = test_app();
    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/verify",
            &json!({"email": "nobody@example.com", "otp": "123456"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_code_cannot_be_replayed() {
    let (app, store) = test_app();

    let (status, _) = send(
        &app,
        post_json("/api/auth/login", &json!({"email": "replay@example.com"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = stored_code(&store, "replay@example.com").await;

    let verify = json!({"email": "replay@example.com", "otp": code});
    let (status, _) = send(&app, post_json("/api/auth/verify", &verify, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, post_json("/api/auth/verify", &verify, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let (app, store) = test_app();

    let (status, _) = send(
        &app,
        post_json("/api/auth/login", &json!({"email": "late@example.com"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let email = Email::parse("late@example.com").unwrap();
    let user = store.user_by_email(&email).await.unwrap().unwrap();
    let code = user.otp_code.clone().unwrap();

    // Rewind the expiry to just before now.
    store
        .set_otp(user.id, &code, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth/verify",
            &json!({"email": "late@example.com", "otp": code.as_str()}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Session enforcement
// =============================================================================

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = test_app();

    let (status, _) = send(&app, get("/api/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/users/me", Some("not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/api/orders", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_token_rejected() {
    let (app, store) = test_app();
    let (_, user_id) = login(&app, &store, "shopper@example.com").await;

    // A token issued just past the validity window ago is dead.
    let signer = TokenSigner::new(&SecretString::from(JWT_SECRET));
    let issued = Utc::now() - SESSION_VALIDITY - Duration::seconds(5);
    let stale = signer.sign_at(user_id, issued).unwrap();

    let (status, _) = send(&app, get("/api/users/me", Some(&stale))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Address
// =============================================================================

#[tokio::test]
async fn test_address_update_and_partial_rejection() {
    let (app, store) = test_app();
    let (token, _) = login(&app, &store, "shopper@example.com").await;

    let full = json!({
        "street": "123 Main St",
        "city": "New York",
        "state": "NY",
        "zipCode": "10001",
        "country": "United States",
    });
    let (status, body) = send(
        &app,
        request_with_json("PUT", "/api/users/address", &full, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"]["zipCode"], "10001");

    // A partial address is rejected whole and leaves the saved one alone.
    let partial = json!({"street": "456 Elm St", "city": "Boston"});
    let (status, _) = send(
        &app,
        request_with_json("PUT", "/api/users/address", &partial, Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/users/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"]["street"], "123 Main St");
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_listing_and_filters() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/products", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 12);
    // Prices serialize as strings.
    assert!(body[0]["price"].is_string());

    let (status, body) = send(&app, get("/api/products?featured=true", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(&app, get("/api/products?category=deodorant", None)).await;
    assert_eq!(status, StatusCode::OK);
    let products = body.as_array().unwrap();
    assert!(!products.is_empty());
    assert!(products.iter().all(|p| p["category"] == "deodorant"));

    let (status, body) = send(&app, get("/api/products?minPrice=100", None)).await;
    assert_eq!(status, StatusCode::OK);
    for product in body.as_array().unwrap() {
        let price: f64 = product["price"].as_str().unwrap().parse().unwrap();
        assert!(price >= 100.0);
    }

    let (status, body) = send(&app, get("/api/products?search=oud", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body.as_array()
            .unwrap()
            .iter()
            .any(|p| p["name"] == "Royal Oud")
    );

    let (status, body) = send(&app, get("/api/products?limit=2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, get("/api/products?category=soap", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_product_detail() {
    let (app, _) = test_app();

    let (status, body) = send(&app, get("/api/products/1", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Midnight Mystique");

    let (status, _) = send(&app, get("/api/products/999", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Orders
// =============================================================================

fn order_payload() -> Value {
    json!({
        "items": [{"product": 1, "quantity": 2, "price": "89.99"}],
        "totalAmount": "179.98",
        "shippingAddress": {
            "street": "123 Main St",
            "city": "New York",
            "state": "NY",
            "zipCode": "10001",
            "country": "United States",
        },
    })
}

#[tokio::test]
async fn test_order_lifecycle() {
    let (app, store) = test_app();
    let (token, _) = login(&app, &store, "shopper@example.com").await;

    let (status, _) = send(&app, post_json("/api/orders", &order_payload(), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, post_json("/api/orders", &order_payload(), Some(&token))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Order placed successfully");
    assert!(body["orderId"].is_number());

    let (status, body) = send(&app, get("/api/orders", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let orders = body.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["totalAmount"], "179.98");
    assert_eq!(orders[0]["status"], "pending");
    assert_eq!(orders[0]["paymentStatus"], "paid");
}

#[tokio::test]
async fn test_order_requires_items() {
    let (app, store) = test_app();
    let (token, _) = login(&app, &store, "shopper@example.com").await;

    let mut payload = order_payload();
    payload["items"] = json!([]);
    let (status, _) = send(&app, post_json("/api/orders", &payload, Some(&token))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_orders_are_scoped_to_user() {
    let (app, store) = test_app();
    let (buyer, _) = login(&app, &store, "buyer@example.com").await;
    let (browser, _) = login(&app, &store, "browser@example.com").await;

    let (status, _) = send(&app, post_json("/api/orders", &order_payload(), Some(&buyer))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/api/orders", Some(&browser))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

// =============================================================================
// Admin
// =============================================================================

#[tokio::test]
async fn test_admin_routes_forbidden_for_regular_users() {
    let (app, store) = test_app();
    let (token, _) = login(&app, &store, "shopper@example.com").await;

    let (status, _) = send(&app, get("/api/admin/orders", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_order_management() {
    let (app, store) = test_app();
    let (buyer, _) = login(&app, &store, "buyer@example.com").await;
    let (admin, admin_id) = login(&app, &store, "admin@example.com").await;
    store.promote_to_admin(admin_id);

    let (status, body) = send(&app, post_json("/api/orders", &order_payload(), Some(&buyer))).await;
    assert_eq!(status, StatusCode::CREATED);
    let order_id = body["orderId"].as_i64().unwrap();

    // The admin sees orders across users.
    let (status, body) = send(&app, get("/api/admin/orders", Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        request_with_json(
            "PATCH",
            &format!("/api/admin/orders/{order_id}"),
            &json!({"status": "shipped"}),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order status updated");

    let (status, body) = send(&app, get("/api/orders", Some(&buyer))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["status"], "shipped");
}

#[tokio::test]
async fn test_admin_status_update_validation() {
    let (app, store) = test_app();
    let (admin, admin_id) = login(&app, &store, "admin@example.com").await;
    store.promote_to_admin(admin_id);

    let (status, _) = send(
        &app,
        request_with_json(
            "PATCH",
            "/api/admin/orders/999",
            &json!({"status": "shipped"}),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request_with_json("PATCH", "/api/admin/orders/1", &json!({}), Some(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
