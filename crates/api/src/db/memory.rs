//! In-memory fixture store.
//!
//! Backs the API when no database is configured (development, tests). Seeded
//! with the demo catalog so the storefront has something to render.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use luxe_scent_core::{
    Email, OrderId, OrderStatus, OtpCode, PaymentStatus, ProductCategory, ProductId, UserId,
};

use crate::models::{Address, NewOrder, Order, Product, ProductFilter, User};

use super::{RepositoryError, Store};

/// In-process store over a mutex-guarded map. Cheap enough for the request
/// volumes a fixture backend sees; no lock is held across an await point.
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

struct Inner {
    users: HashMap<i32, User>,
    next_user_id: i32,
    products: Vec<Product>,
    orders: Vec<Order>,
    next_order_id: i32,
}

impl MemoryStore {
    /// Create a store seeded with the demo catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: HashMap::new(),
                next_user_id: 1,
                products: fixture_catalog(),
                orders: Vec::new(),
                next_order_id: 1,
            }),
        }
    }

    /// Grant admin access to a user. Test-support only; there is no admin
    /// promotion endpoint.
    pub fn promote_to_admin(&self, id: UserId) {
        let mut inner = self.lock();
        if let Some(user) = inner.users.get_mut(&id.as_i32()) {
            user.is_admin = true;
            user.updated_at = Utc::now();
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let inner = self.lock();
        Ok(inner.users.values().find(|u| &u.email == email).cloned())
    }

    async fn user_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let inner = self.lock();
        Ok(inner.users.get(&id.as_i32()).cloned())
    }

    async fn create_user(&self, email: &Email) -> Result<User, RepositoryError> {
        let mut inner = self.lock();
        if inner.users.values().any(|u| &u.email == email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let id = inner.next_user_id;
        inner.next_user_id += 1;

        let user = User {
            id: UserId::new(id),
            email: email.clone(),
            is_admin: false,
            address: None,
            otp_code: None,
            otp_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn set_otp(
        &self,
        id: UserId,
        code: &OtpCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        user.otp_code = Some(code.clone());
        user.otp_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_otp(&self, id: UserId) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        user.otp_code = None;
        user.otp_expires_at = None;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_address(&self, id: UserId, address: &Address) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let user = inner
            .users
            .get_mut(&id.as_i32())
            .ok_or(RepositoryError::NotFound)?;
        user.address = Some(address.clone());
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let inner = self.lock();
        Ok(inner
            .products
            .iter()
            .filter(|p| filter.accepts(p))
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn product_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let inner = self.lock();
        Ok(inner.products.iter().find(|p| p.id == id).cloned())
    }

    async fn create_order(&self, user: UserId, order: NewOrder) -> Result<Order, RepositoryError> {
        let mut inner = self.lock();
        let id = inner.next_order_id;
        inner.next_order_id += 1;

        let order = Order {
            id: OrderId::new(id),
            user,
            items: order.items,
            total_amount: order.total_amount,
            shipping_address: order.shipping_address,
            status: OrderStatus::Pending,
            // Payment capture is out of scope; orders arrive already paid.
            payment_status: PaymentStatus::Paid,
            created_at: Utc::now(),
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn orders_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.lock();
        let mut orders: Vec<Order> = inner
            .orders
            .iter()
            .filter(|o| o.user == user)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn all_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let inner = self.lock();
        let mut orders = inner.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.lock();
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(RepositoryError::NotFound)?;
        order.status = status;
        Ok(())
    }
}

/// The demo catalog shipped with the fixture backend.
fn fixture_catalog() -> Vec<Product> {
    let product = |id: i32,
                   name: &str,
                   brand: &str,
                   description: &str,
                   price: Decimal,
                   old_price: Option<Decimal>,
                   image: &str,
                   category: ProductCategory,
                   stock: i32,
                   featured: bool| Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        brand: brand.to_owned(),
        description: description.to_owned(),
        price,
        old_price,
        image: image.to_owned(),
        category,
        stock,
        featured,
    };

    vec![
        product(
            1,
            "Midnight Mystique",
            "Luxe Noir",
            "A captivating blend of exotic spices and deep amber. Opens with \
             bergamot and cardamom over a heart of jasmine and iris.",
            Decimal::new(8999, 2),
            None,
            "https://images.pexels.com/photos/965989/pexels-photo-965989.jpeg",
            ProductCategory::Perfume,
            15,
            true,
        ),
        product(
            2,
            "Golden Aura",
            "Eclat",
            "Luxurious notes of jasmine, vanilla, and sandalwood blend \
             harmoniously in this elegant fragrance.",
            Decimal::new(7550, 2),
            Some(Decimal::new(9500, 2)),
            "https://images.pexels.com/photos/3059609/pexels-photo-3059609.jpeg",
            ProductCategory::Perfume,
            8,
            true,
        ),
        product(
            3,
            "Velvet Rose",
            "Opulence",
            "An elegant composition featuring Bulgarian rose and patchouli, \
             with sparkling pink pepper and raspberry on top.",
            Decimal::new(12000, 2),
            None,
            "https://images.pexels.com/photos/265144/pexels-photo-265144.jpeg",
            ProductCategory::Perfume,
            12,
            true,
        ),
        product(
            4,
            "Ocean Breeze",
            "Aqua Vitae",
            "Fresh and invigorating scent with notes of sea salt and citrus. \
             Perfect for those who love clean, marine fragrances.",
            Decimal::new(6500, 2),
            None,
            "https://images.pexels.com/photos/190333/pexels-photo-190333.jpeg",
            ProductCategory::BodySpray,
            20,
            false,
        ),
        product(
            5,
            "Arctic Chill",
            "Nordic",
            "A cool, refreshing deodorant with long-lasting protection. \
             Features crisp mint and eucalyptus notes.",
            Decimal::new(2599, 2),
            None,
            "https://images.pexels.com/photos/5748755/pexels-photo-5748755.jpeg",
            ProductCategory::Deodorant,
            30,
            false,
        ),
        product(
            6,
            "Amber Woods",
            "Luxe Noir",
            "Warm and woody scent perfect for evening occasions. A \
             sophisticated blend of amber, cedarwood, and vanilla.",
            Decimal::new(9500, 2),
            None,
            "https://images.pexels.com/photos/755992/pexels-photo-755992.jpeg",
            ProductCategory::Perfume,
            7,
            false,
        ),
        product(
            7,
            "Royal Oud",
            "Opulence",
            "A majestic fragrance featuring rare oud wood, saffron, and rose. \
             Perfect for special occasions.",
            Decimal::new(18000, 2),
            None,
            "https://images.pexels.com/photos/3059609/pexels-photo-3059609.jpeg",
            ProductCategory::Perfume,
            5,
            false,
        ),
        product(
            8,
            "Summer Breeze",
            "Aqua Vitae",
            "Light and refreshing body spray with notes of coconut, vanilla, \
             and tropical flowers.",
            Decimal::new(4500, 2),
            None,
            "https://images.pexels.com/photos/190333/pexels-photo-190333.jpeg",
            ProductCategory::BodySpray,
            25,
            false,
        ),
        product(
            9,
            "Fresh Pine",
            "Nordic",
            "Invigorating deodorant with the crisp scent of pine needles and \
             mountain air.",
            Decimal::new(2299, 2),
            None,
            "https://images.pexels.com/photos/5748755/pexels-photo-5748755.jpeg",
            ProductCategory::Deodorant,
            40,
            false,
        ),
        product(
            10,
            "Citrus Splash",
            "Eclat",
            "Energizing fragrance with notes of bergamot, lemon, and mandarin \
             orange.",
            Decimal::new(8500, 2),
            None,
            "https://images.pexels.com/photos/965989/pexels-photo-965989.jpeg",
            ProductCategory::Perfume,
            18,
            false,
        ),
        product(
            11,
            "Lavender Dreams",
            "Opulence",
            "Calming and romantic fragrance featuring lavender, vanilla, and \
             soft musk.",
            Decimal::new(11000, 2),
            None,
            "https://images.pexels.com/photos/3059609/pexels-photo-3059609.jpeg",
            ProductCategory::Perfume,
            10,
            false,
        ),
        product(
            12,
            "Sport Fresh",
            "Nordic",
            "Long-lasting deodorant perfect for active lifestyles. Features a \
             clean, energetic scent.",
            Decimal::new(2499, 2),
            None,
            "https://images.pexels.com/photos/5748755/pexels-photo-5748755.jpeg",
            ProductCategory::Deodorant,
            35,
            false,
        ),
    ]
}
