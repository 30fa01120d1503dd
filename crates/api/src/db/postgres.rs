//! `PostgreSQL` store backend.
//!
//! Queries are bound at runtime so the crate builds without a live database.
//! Rows are decoded into plain row structs and then parsed into domain types;
//! anything stored that no longer parses surfaces as
//! [`RepositoryError::DataCorruption`].

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};

use luxe_scent_core::{
    Email, OrderId, OrderStatus, OtpCode, PaymentStatus, ProductCategory, ProductId, UserId,
};

use crate::models::{Address, NewOrder, Order, OrderItem, Product, ProductFilter, User};

use super::{RepositoryError, Store};

/// Store backed by a `PostgreSQL` connection pool.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, email, is_admin, street, city, state, zip_code, country, \
                            otp_code, otp_expires_at, created_at, updated_at";

const PRODUCT_COLUMNS: &str =
    "id, name, brand, description, price, old_price, image, category, stock, featured";

const ORDER_COLUMNS: &str = "id, user_id, items, total_amount, street, city, state, zip_code, \
                             country, status, payment_status, created_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    is_admin: bool,
    street: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
    otp_code: Option<String>,
    otp_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        let otp_code = row
            .otp_code
            .as_deref()
            .map(OtpCode::parse)
            .transpose()
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid one-time code in database: {e}"))
            })?;

        // Address columns are written atomically, so either all five are set
        // or none are.
        let address = match (row.street, row.city, row.state, row.zip_code, row.country) {
            (Some(street), Some(city), Some(state), Some(zip_code), Some(country)) => {
                Some(Address {
                    street,
                    city,
                    state,
                    zip_code,
                    country,
                })
            }
            (None, None, None, None, None) => None,
            _ => {
                return Err(RepositoryError::DataCorruption(
                    "partial address in database".to_owned(),
                ));
            }
        };

        Ok(Self {
            id: UserId::new(row.id),
            email,
            is_admin: row.is_admin,
            address,
            otp_code,
            otp_expires_at: row.otp_expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    brand: String,
    description: String,
    price: Decimal,
    old_price: Option<Decimal>,
    image: String,
    category: String,
    stock: i32,
    featured: bool,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = ProductCategory::from_str(&row.category).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product category in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            brand: row.brand,
            description: row.description,
            price: row.price,
            old_price: row.old_price,
            image: row.image,
            category,
            stock: row.stock,
            featured: row.featured,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    street: String,
    city: String,
    state: String,
    zip_code: String,
    country: String,
    status: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = OrderStatus::from_str(&row.status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;
        let payment_status = PaymentStatus::from_str(&row.payment_status).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user: UserId::new(row.user_id),
            items: row.items.0,
            total_amount: row.total_amount,
            shipping_address: Address {
                street: row.street,
                city: row.city,
                state: row.state,
                zip_code: row.zip_code,
                country: row.country,
            },
            status,
            payment_status,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, email: &Email) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (email) VALUES ($1) RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        User::try_from(row)
    }

    async fn set_otp(
        &self,
        id: UserId,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET otp_code = $1, otp_expires_at = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(code.as_str())
        .bind(expires_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn clear_otp(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET otp_code = NULL, otp_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn set_address(&self, id: UserId, address: &Address) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET street = $1, city = $2, state = $3, zip_code = $4, \
             country = $5, updated_at = NOW() WHERE id = $6",
        )
        .bind(&address.street)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip_code)
        .bind(&address.country)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));

        if let Some(category) = filter.category {
            query.push(" AND category = ").push_bind(category.to_string());
        }
        if let Some(brand) = &filter.brand {
            query.push(" AND brand = ").push_bind(brand.clone());
        }
        if let Some(min) = filter.min_price {
            query.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            query.push(" AND price <= ").push_bind(max);
        }
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            query
                .push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR brand ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(featured) = filter.featured {
            query.push(" AND featured = ").push_bind(featured);
        }

        let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
        query.push(" ORDER BY id ASC LIMIT ").push_bind(limit);

        let rows: Vec<ProductRow> = query.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> =
            sqlx::query_as(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Product::try_from).transpose()
    }

    async fn create_order(&self, user: UserId, order: NewOrder) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(&format!(
            "INSERT INTO orders \
             (user_id, items, total_amount, street, city, state, zip_code, country, \
              status, payment_status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(&order.shipping_address.street)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.zip_code)
        .bind(&order.shipping_address.country)
        .bind(OrderStatus::Pending.to_string())
        .bind(PaymentStatus::Paid.to_string())
        .fetch_one(&self.pool)
        .await?;

        Order::try_from(row)
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
