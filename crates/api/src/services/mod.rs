//! Business logic above the store layer.

pub mod auth;
pub mod mailer;
pub mod token;

pub use auth::{AuthError, AuthService};
pub use mailer::{HttpMailer, LogMailer, Mailer, MailerError};
pub use token::{TokenError, TokenSigner};
