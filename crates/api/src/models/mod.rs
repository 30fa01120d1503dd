//! Domain models.
//!
//! These types represent validated domain objects, separate from wire
//! payloads and database rows.

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order, OrderItem};
pub use product::{Product, ProductFilter};
pub use user::{Address, User, UserProfile};
