//! Order endpoints for the authenticated user.

use axum::{Json, extract::State, http::StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, Result};
use crate::middleware::CurrentUser;
use crate::models::{Address, NewOrder, Order, OrderItem};
use crate::state::AppState;

/// Request to place an order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Option<Vec<OrderItem>>,
    pub total_amount: Option<Decimal>,
    pub shipping_address: Option<Address>,
}

impl CreateOrderRequest {
    fn into_new_order(self) -> Result<NewOrder> {
        let items = self
            .items
            .filter(|items| !items.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Order items are required".to_string()))?;
        let total_amount = self
            .total_amount
            .ok_or_else(|| ApiError::BadRequest("Total amount is required".to_string()))?;
        let shipping_address = self
            .shipping_address
            .ok_or_else(|| ApiError::BadRequest("Shipping address is required".to_string()))?;

        Ok(NewOrder {
            items,
            total_amount,
            shipping_address,
        })
    }
}

/// Place an order for the current user.
///
/// POST /api/orders
///
/// # Errors
///
/// Returns 400 when items, total, or shipping address are missing.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let new_order = request.into_new_order()?;
    let order = state.store().create_order(user.id, new_order).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order placed successfully",
            "orderId": order.id,
        })),
    ))
}

/// The current user's orders, newest first.
///
/// GET /api/orders
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Order>>> {
    let orders = state.store().orders_for_user(user.id).await?;
    Ok(Json(orders))
}
