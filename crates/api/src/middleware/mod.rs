//! Request middleware: authentication extractors and rate limiting.

pub mod auth;
pub mod rate_limit;

pub use auth::{CurrentAdmin, CurrentUser};
pub use rate_limit::auth_rate_limiter;
