//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use luxe_scent_core::{OrderId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::user::Address;

/// A line item within an order.
///
/// `price` is the unit price at the time of purchase, not a live catalog
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ProductId,
    pub quantity: i32,
    pub price: Decimal,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: Address,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Validated input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub shipping_address: Address,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_wire_names() {
        let order = Order {
            id: OrderId::new(1),
            user: UserId::new(2),
            items: vec![OrderItem {
                product: ProductId::new(3),
                quantity: 2,
                price: Decimal::new(8999, 2),
            }],
            total_amount: Decimal::new(17998, 2),
            shipping_address: Address {
                street: "123 Main St".into(),
                city: "New York".into(),
                state: "NY".into(),
                zip_code: "10001".into(),
                country: "United States".into(),
            },
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Paid,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["totalAmount"], "179.98");
        assert_eq!(json["paymentStatus"], "paid");
        assert_eq!(json["shippingAddress"]["zipCode"], "10001");
        assert_eq!(json["items"][0]["quantity"], 2);
    }
}
