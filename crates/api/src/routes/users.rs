//! Account endpoints for the authenticated user.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Address, UserProfile};
use crate::state::AppState;

/// Request to replace the shipping address. Every field is required; the
/// address is stored whole or not at all.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressRequest {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl UpdateAddressRequest {
    /// Validate into a complete address. Missing, empty, and whitespace-only
    /// fields all count as absent.
    fn into_address(self) -> Option<Address> {
        let required = |field: Option<String>| {
            let value = field?;
            if value.trim().is_empty() {
                return None;
            }
            Some(value)
        };

        Some(Address {
            street: required(self.street)?,
            city: required(self.city)?,
            state: required(self.state)?,
            zip_code: required(self.zip_code)?,
            country: required(self.country)?,
        })
    }
}

/// The current user's profile.
///
/// GET /api/users/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}

/// Replace the current user's shipping address.
///
/// PUT /api/users/address
///
/// # Errors
///
/// Returns 400 unless all five address fields are present and non-empty; a
/// partial update never goes through.
pub async fn update_address(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<UpdateAddressRequest>,
) -> Result<Json<Value>> {
    let address = request
        .into_address()
        .ok_or_else(|| ApiError::BadRequest("All address fields are required".to_string()))?;

    state.store().set_address(user.id, &address).await?;

    Ok(Json(json!({
        "message": "Address updated successfully",
        "address": address,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> UpdateAddressRequest {
        UpdateAddressRequest {
            street: Some("123 Main St".to_string()),
            city: Some("New York".to_string()),
            state: Some("NY".to_string()),
            zip_code: Some("10001".to_string()),
            country: Some("United States".to_string()),
        }
    }

    #[test]
    fn test_complete_address_accepted() {
        assert!(full_request().into_address().is_some());
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut request = full_request();
        request.country = None;
        assert!(request.into_address().is_none());
    }

    #[test]
    fn test_blank_field_rejected() {
        let mut request = full_request();
        request.city = Some("   ".to_string());
        assert!(request.into_address().is_none());
    }
}
