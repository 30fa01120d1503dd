//! Admin endpoints. Every handler takes [`CurrentAdmin`], so a valid session
//! without the admin flag gets 403 before any handler code runs.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use luxe_scent_core::{OrderId, OrderStatus};

use crate::db::RepositoryError;
use crate::error::{ApiError, Result};
use crate::middleware::CurrentAdmin;
use crate::models::Order;
use crate::state::AppState;

/// Request to change an order's fulfillment status.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<OrderStatus>,
}

/// Every order across all users, newest first.
///
/// GET /api/admin/orders
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn orders(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = state.store().all_orders().await?;
    Ok(Json(orders))
}

/// Update an order's fulfillment status.
///
/// PATCH /api/admin/orders/{id}
///
/// # Errors
///
/// Returns 400 for a missing or unknown status value and 404 for an unknown
/// order.
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentAdmin(_): CurrentAdmin,
    Path(id): Path<i32>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>> {
    let status = request
        .status
        .ok_or_else(|| ApiError::BadRequest("Status is required".to_string()))?;

    state
        .store()
        .set_order_status(OrderId::new(id), status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => ApiError::NotFound("Order not found".to_string()),
            other => ApiError::Database(other),
        })?;

    Ok(Json(json!({ "message": "Order status updated" })))
}
