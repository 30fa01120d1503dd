//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use luxe_scent_core::{Email, OtpCode, UserId};

/// A registered user.
///
/// Users are created implicitly on their first login attempt; there is no
/// separate registration step. The OTP fields are transient: set together by
/// a login, cleared together by the one successful verification.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address, stored exactly as first seen.
    pub email: Email,
    /// Whether this user may access admin routes.
    pub is_admin: bool,
    /// Shipping address, if one has been saved.
    pub address: Option<Address>,
    /// Outstanding one-time code, present only between issuance and
    /// consumption.
    pub otp_code: Option<OtpCode>,
    /// Instant after which the outstanding code is invalid.
    pub otp_expires_at: Option<DateTime<Utc>>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The public projection returned to clients. Never includes OTP fields.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            is_admin: self.is_admin,
            address: self.address.clone(),
        }
    }
}

/// A shipping address. All fields are required; partial addresses are
/// rejected at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Public projection of a [`User`] for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub is_admin: bool,
    pub address: Option<Address>,
}
