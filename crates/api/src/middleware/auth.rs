//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a bearer session token in route
//! handlers. Tokens are verified against the signing secret and resolved to a
//! live user on every request, so a deleted account cannot keep using an old
//! token.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer session token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct CurrentUser(pub User);

/// Extractor that additionally requires the user to be an admin.
pub struct CurrentAdmin(pub User);

/// Error returned when a request fails authentication or authorization.
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// Token failed verification or has expired.
    InvalidToken,
    /// Token verified but the user no longer exists.
    UnknownUser,
    /// Authenticated, but the route requires admin access.
    NotAdmin,
    /// Store lookup failed.
    StoreUnavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Authentication required"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
            Self::UnknownUser => (StatusCode::UNAUTHORIZED, "User not found"),
            Self::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            Self::StoreUnavailable => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;

        let user_id = state
            .tokens()
            .verify(token)
            .map_err(|_| AuthRejection::InvalidToken)?;

        let user = state
            .store()
            .user_by_id(user_id)
            .await
            .map_err(|_| AuthRejection::StoreUnavailable)?
            .ok_or(AuthRejection::UnknownUser)?;

        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin {
            return Err(AuthRejection::NotAdmin);
        }
        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
