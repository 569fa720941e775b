use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLineItem;

/// How the customer pays for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    CashOnDelivery,
}

/// Order lifecycle status.
///
/// Orders currently transition straight to `Completed` once the simulated
/// payment succeeds. `Pending` and `Cancelled` are reserved for a future
/// asynchronous payment confirmation flow; no implemented transition reaches
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// A committed order.
///
/// `items` and `total_price` are a deep snapshot of the cart at checkout
/// time; later cart mutations never alter an order. Card numbers are stored
/// masked to the last four digits and the CVV is never stored at all. Orders
/// are immutable once created: there is no update or delete operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<CartLineItem>,
    pub total_price: Decimal,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
