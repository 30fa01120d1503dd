//! Core types for the Luxe Scent API.

pub mod category;
pub mod email;
pub mod id;
pub mod otp;
pub mod status;

pub use category::ProductCategory;
pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
pub use status::{OrderStatus, PaymentStatus};
