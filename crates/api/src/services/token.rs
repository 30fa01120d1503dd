//! Session token signing and verification.
//!
//! Sessions are stateless JWTs (HS256) carrying the user ID. A token is valid
//! for exactly seven days from issuance; validation runs with zero leeway so
//! the window does not silently stretch.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use luxe_scent_core::UserId;

/// How long a session token stays valid.
pub const SESSION_VALIDITY: Duration = Duration::days(7);

/// Errors from token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token failed signature or claims validation.
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User ID.
    sub: String,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// Signs and verifies session tokens with a shared HMAC secret.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        // Default leeway is 60s; a token is either inside its window or not.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        }
    }

    /// Sign a session token for a user, valid from now.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if encoding fails.
    pub fn sign(&self, user: UserId) -> Result<String, TokenError> {
        self.sign_at(user, Utc::now())
    }

    /// Sign a session token valid from the given instant. Split out so tests
    /// can mint tokens issued in the past.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` if encoding fails.
    pub fn sign_at(&self, user: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user.as_i32().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + SESSION_VALIDITY).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify a token and return the user ID it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for bad signatures, expired tokens, or
    /// malformed claims.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        let id: i32 = data
            .claims
            .sub
            .parse()
            .map_err(|_| jsonwebtoken::errors::ErrorKind::InvalidSubject)?;
        Ok(UserId::new(id))
    }
}

impl From<jsonwebtoken::errors::ErrorKind> for TokenError {
    fn from(kind: jsonwebtoken::errors::ErrorKind) -> Self {
        Self::Invalid(kind.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new(&SecretString::from(
            "0123456789abcdef0123456789abcdef-test-only",
        ))
    }

    #[test]
    fn test_roundtrip() {
        let signer = signer();
        let token = signer.sign(UserId::new(42)).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_expired_token_rejected() {
        let signer = signer();
        let issued = Utc::now() - SESSION_VALIDITY - Duration::seconds(5);
        let token = signer.sign_at(UserId::new(42), issued).unwrap();
        assert!(signer.verify(&token).is_err());
    }

    #[test]
    fn test_token_valid_just_inside_window() {
        let signer = signer();
        let issued = Utc::now() - SESSION_VALIDITY + Duration::seconds(60);
        let token = signer.sign_at(UserId::new(42), issued).unwrap();
        assert!(signer.verify(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().sign(UserId::new(42)).unwrap();
        let other = TokenSigner::new(&SecretString::from(
            "fedcba9876543210fedcba9876543210-test-only",
        ));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let signer = signer();
        let mut token = signer.sign(UserId::new(42)).unwrap();
        token.push('x');
        assert!(signer.verify(&token).is_err());
    }
}
