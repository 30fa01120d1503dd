//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET   /health                  - Liveness check
//! GET   /health/ready            - Readiness check (pings the store)
//!
//! # Auth (rate limited)
//! POST  /api/auth/login          - Issue a one-time code by email
//! POST  /api/auth/verify         - Exchange a code for a session token
//!
//! # Users (requires auth)
//! GET   /api/users/me            - Current user's profile
//! PUT   /api/users/address       - Replace the shipping address
//!
//! # Products (public)
//! GET   /api/products            - Catalog listing with filters
//! GET   /api/products/{id}       - Product detail
//!
//! # Orders (requires auth)
//! POST  /api/orders              - Place an order
//! GET   /api/orders              - Current user's orders
//!
//! # Admin (requires admin)
//! GET   /api/admin/orders        - All orders
//! PATCH /api/admin/orders/{id}   - Update fulfillment status
//! ```

pub mod admin;
pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/verify", post(auth::verify))
        .layer(auth_rate_limiter())
}

/// Create the user account routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(users::me))
        .route("/address", put(users::update_address))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(orders::create).get(orders::index))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(admin::orders))
        .route("/orders/{id}", patch(admin::update_order_status))
}

/// Build the full application router over the given state.
#[must_use]
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/users", user_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/admin", admin_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
