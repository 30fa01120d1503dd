//! One-time verification codes.

use core::fmt;

use rand::Rng;
use subtle::ConstantTimeEq;

/// Number of digits in a code.
pub const OTP_LENGTH: usize = 6;

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum OtpCodeError {
    /// The input is not exactly six characters.
    #[error("code must be exactly {OTP_LENGTH} digits")]
    WrongLength,
    /// The input contains a non-digit character.
    #[error("code must contain only digits")]
    NonDigit,
}

/// A six-digit one-time code, delivered by email and exchanged for a session
/// token.
///
/// Codes are generated uniformly from [100000, 999999] and compared as opaque
/// strings in constant time. `Debug` output is redacted; the raw digits are
/// only reachable through [`OtpCode::as_str`].
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a fresh code from the given RNG.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.random_range(100_000..=999_999).to_string())
    }

    /// Parse a stored code.
    ///
    /// # Errors
    ///
    /// Returns an error unless the input is exactly six ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        if s.len() != OTP_LENGTH {
            return Err(OtpCodeError::WrongLength);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }
        Ok(Self(s.to_owned()))
    }

    /// Compare against a submitted code in constant time.
    ///
    /// The length of a valid code is public (always six digits), so a length
    /// pre-check leaks nothing.
    #[must_use]
    pub fn matches(&self, submitted: &str) -> bool {
        if submitted.len() != self.0.len() {
            return false;
        }
        self.0.as_bytes().ct_eq(submitted.as_bytes()).into()
    }

    /// Returns the code digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}
