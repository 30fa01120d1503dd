//! Login and code verification endpoints.
//!
//! JSON API endpoints for the email one-time-code flow. Login always answers
//! with the same message whether or not the account existed before, so the
//! endpoint cannot be used to enumerate addresses.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use luxe_scent_core::Email;

use crate::error::{ApiError, Result};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Request to start a login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
}

/// Request to exchange a code for a session token.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub email: Option<String>,
    pub otp: Option<String>,
}

/// Issue a one-time code to an email address.
///
/// POST /api/auth/login
///
/// Creates the account on first contact. The response never reveals whether
/// the address was already registered.
///
/// # Errors
///
/// Returns 400 for a missing or malformed email.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let email = request
        .email
        .ok_or_else(|| ApiError::BadRequest("Email is required".to_string()))?;
    let email = Email::parse(&email)
        .map_err(|e| ApiError::BadRequest(format!("Invalid email address: {e}")))?;

    state.auth().request_code(&email).await?;

    Ok(Json(json!({
        "message": "Verification code sent to your email"
    })))
}

/// Exchange a one-time code for a session token.
///
/// POST /api/auth/verify
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown email, and 401 for a
/// wrong or expired code.
pub async fn verify(
    State(state): State<AppState>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Value>> {
    let (Some(email), Some(otp)) = (request.email, request.otp) else {
        return Err(ApiError::BadRequest(
            "Email and OTP are required".to_string(),
        ));
    };

    // An address that can't parse can't belong to any account.
    let email = Email::parse(&email).map_err(|_| ApiError::Auth(AuthError::UserNotFound))?;

    let user = state.auth().verify_code(&email, &otp).await?;
    let token = state
        .tokens()
        .sign(user.id)
        .map_err(|e| ApiError::Internal(format!("failed to sign session token: {e}")))?;

    Ok(Json(json!({
        "token": token,
        "user": user.profile(),
    })))
}
