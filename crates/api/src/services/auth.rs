//! Email one-time-code authentication.
//!
//! Login issues a six-digit code with a ten-minute window; verification
//! exchanges the code for a session token. Users are created implicitly on
//! first login.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use luxe_scent_core::{Email, OtpCode};

use crate::db::{RepositoryError, Store};
use crate::models::User;
use crate::services::mailer::Mailer;

/// How long an issued code stays valid.
pub const OTP_VALIDITY: Duration = Duration::minutes(10);

/// Errors from the authentication flow.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No account exists for the email.
    #[error("user not found")]
    UserNotFound,

    /// The submitted code does not match the outstanding one, or there is no
    /// outstanding code.
    #[error("invalid verification code")]
    InvalidCode,

    /// The outstanding code matched but its window has passed.
    #[error("verification code has expired")]
    ExpiredCode,

    /// Store operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Whether a code's validity window has passed at `now`.
///
/// Strictly after: a code submitted at the exact expiry instant is still
/// valid.
fn code_expired(now: DateTime<Utc>, expires_at: DateTime<Utc>) -> bool {
    now > expires_at
}

/// The login and verification flow over a [`Store`] and a [`Mailer`].
pub struct AuthService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>) -> Self {
        Self { store, mailer }
    }

    /// Issue a fresh one-time code for the email, creating the account if it
    /// does not exist yet. A new code overwrites any outstanding one.
    ///
    /// Delivery is fire-and-forget: the HTTP response never waits on the mail
    /// transport, and a delivery failure is logged rather than surfaced, so
    /// the endpoint cannot be used to probe which addresses exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the store fails.
    pub async fn request_code(&self, email: &Email) -> Result<(), AuthError> {
        let user = match self.store.user_by_email(email).await? {
            Some(user) => user,
            None => self.store.create_user(email).await?,
        };

        let code = OtpCode::generate(&mut rand::rng());
        let expires_at = Utc::now() + OTP_VALIDITY;
        self.store.set_otp(user.id, &code, expires_at).await?;

        let mailer = Arc::clone(&self.mailer);
        let to = email.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send_code(&to, &code).await {
                tracing::warn!(email = %to, error = %e, "failed to deliver verification code");
            }
        });

        Ok(())
    }

    /// Exchange a submitted code for the verified user.
    ///
    /// The code is consumed on success; replaying it fails with
    /// `InvalidCode`. Mismatch is checked before expiry, so a wrong code
    /// never reveals whether the real one has lapsed.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` for unknown emails, `InvalidCode` for a
    /// mismatched or absent code, `ExpiredCode` past the window, and
    /// `Repository` if the store fails.
    pub async fn verify_code(&self, email: &Email, submitted: &str) -> Result<User, AuthError> {
        let mut user = self
            .store
            .user_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let matches = user
            .otp_code
            .as_ref()
            .is_some_and(|code| code.matches(submitted));
        if !matches {
            return Err(AuthError::InvalidCode);
        }

        let expired = user
            .otp_expires_at
            .is_none_or(|expires_at| code_expired(Utc::now(), expires_at));
        if expired {
            return Err(AuthError::ExpiredCode);
        }

        self.store.clear_otp(user.id).await?;
        user.otp_code = None;
        user.otp_expires_at = None;
        Ok(user)
    }
}
