//! Store backends.
//!
//! The [`Store`] trait is the persistence seam for the whole API. Two
//! implementations exist and are selected explicitly at startup (never as a
//! runtime fallback):
//!
//! - [`postgres::PgStore`] - production backend over `PostgreSQL`
//! - [`memory::MemoryStore`] - in-process backend seeded with the demo
//!   catalog, used for development without a database and by the test suite
//!
//! # Migrations
//!
//! `PostgreSQL` migrations live in `crates/api/migrations/` and are NOT run
//! automatically on startup. Apply them with `sqlx migrate run`.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use luxe_scent_core::{Email, OrderId, OrderStatus, OtpCode, ProductId, UserId};

use crate::models::{Address, NewOrder, Order, Product, ProductFilter, User};

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The target row does not exist.
    #[error("not found")]
    NotFound,

    /// Stored data failed to parse back into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// The persistence seam for users, the catalog, and orders.
///
/// The OTP pair is only reachable through [`Store::set_otp`] and
/// [`Store::clear_otp`], so `otp_code` and `otp_expires_at` can never
/// diverge: they are written together and erased together.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check for the readiness probe.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // =========================================================================
    // Users
    // =========================================================================

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Create a user with defaults (non-admin, no address, no OTP).
    async fn create_user(&self, email: &Email) -> Result<User, RepositoryError>;

    /// Set the outstanding one-time code and its expiry. Overwrites any
    /// previous pair (last write wins across concurrent logins).
    async fn set_otp(
        &self,
        id: UserId,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Erase the outstanding one-time code and its expiry.
    async fn clear_otp(&self, id: UserId) -> Result<(), RepositoryError>;

    /// Replace the user's shipping address.
    async fn set_address(&self, id: UserId, address: &Address) -> Result<(), RepositoryError>;

    // =========================================================================
    // Catalog
    // =========================================================================

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    // =========================================================================
    // Orders
    // =========================================================================

    async fn create_order(&self, user: UserId, order: NewOrder) -> Result<Order, RepositoryError>;

    /// The user's orders, newest first.
    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Every order, newest first.
    async fn all_orders(&self) -> Result<Vec<Order>, RepositoryError>;

    /// Update an order's fulfillment status.
    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
