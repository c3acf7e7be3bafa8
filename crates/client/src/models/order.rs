//! Order types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jacaranda_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, Price, ProductId, VariantId};

use super::user::ShippingAddress;

/// A placed order as returned by `GET /orders`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub total_price: Price,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
}

/// A line of a placed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<NewOrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// One requested line of a new order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parses_string_total() {
        // The backend serializes decimal totals as strings.
        let order: Order = serde_json::from_str(
            r#"{
                "id": "o-1",
                "createdAt": "2026-02-01T09:30:00Z",
                "totalPrice": "149.70",
                "status": "PENDING",
                "paymentStatus": "PAID",
                "items": [],
                "shippingAddress": {"street": "Rua A", "city": "Campinas"}
            }"#,
        )
        .unwrap();

        assert_eq!(order.total_price.to_string(), "$149.70");
        assert_eq!(order.payment_status, PaymentStatus::Paid);
    }
}
