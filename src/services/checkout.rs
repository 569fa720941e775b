use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::cart::CartLineItem,
    models::order::{Order, OrderStatus, PaymentMethod},
    services::{cart::CartService, orders::OrderService},
};

/// Checkout form data as submitted by the storefront.
///
/// The CVV is captured for the simulated authorization step only; it is
/// dropped unconditionally before the order is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub cvv: Option<String>,
}

/// The checkout field that failed validation.
///
/// The storefront surfaces one error at a time in form order, so the
/// validator reports exactly one field and the ordering is part of the
/// contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutField {
    CustomerName,
    CustomerEmail,
    CustomerPhone,
    Address,
    City,
    PostalCode,
    CardNumber,
    ExpiryDate,
    Cvv,
}

impl CheckoutField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerName => "customer_name",
            Self::CustomerEmail => "customer_email",
            Self::CustomerPhone => "customer_phone",
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postal_code",
            Self::CardNumber => "card_number",
            Self::ExpiryDate => "expiry_date",
            Self::Cvv => "cvv",
        }
    }
}

impl fmt::Display for CheckoutField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `MM/YY`: two digits, a slash, two digits.
fn is_expiry_shape(expiry: &str) -> bool {
    let bytes = expiry.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b'/'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
}

/// Validates a checkout form, failing fast on the first violation in form
/// order. Card checks run only for card payment.
///
/// The expiry check is shape-only: month range and expiration in the past
/// are deliberately not validated, matching the storefront's behavior.
pub fn validate_checkout_form(form: &CheckoutForm) -> Result<(), CheckoutField> {
    if form.customer_name.trim().is_empty() {
        return Err(CheckoutField::CustomerName);
    }
    if form.customer_email.trim().is_empty() || !form.customer_email.contains('@') {
        return Err(CheckoutField::CustomerEmail);
    }
    if form.customer_phone.trim().is_empty() || digits(&form.customer_phone).len() < 9 {
        return Err(CheckoutField::CustomerPhone);
    }
    if form.address.trim().is_empty() {
        return Err(CheckoutField::Address);
    }
    if form.city.trim().is_empty() {
        return Err(CheckoutField::City);
    }
    if form.postal_code.trim().is_empty() {
        return Err(CheckoutField::PostalCode);
    }

    if form.payment_method == PaymentMethod::Card {
        let card_number = form.card_number.as_deref().unwrap_or("");
        if card_number.trim().is_empty() || digits(card_number).len() != 16 {
            return Err(CheckoutField::CardNumber);
        }

        let expiry = form.expiry_date.as_deref().unwrap_or("");
        if expiry.trim().is_empty() || !is_expiry_shape(expiry) {
            return Err(CheckoutField::ExpiryDate);
        }

        let cvv = form.cvv.as_deref().unwrap_or("");
        let cvv_digits = digits(cvv).len();
        if cvv.trim().is_empty() || !(cvv_digits == 3 || cvv_digits == 4) {
            return Err(CheckoutField::Cvv);
        }
    }

    Ok(())
}

/// Result of the simulated payment authorization step.
#[derive(Debug)]
pub struct PaymentAuthorization {
    pub transaction_id: Uuid,
    pub amount: Decimal,
}

/// Checkout orchestrator: the only component that creates orders.
pub struct CheckoutService {
    cart: Arc<CartService>,
    orders: Arc<OrderService>,
    event_sender: Arc<EventSender>,
    payment_delay: Duration,
}

impl CheckoutService {
    pub fn new(
        cart: Arc<CartService>,
        orders: Arc<OrderService>,
        event_sender: Arc<EventSender>,
        payment_delay: Duration,
    ) -> Self {
        Self {
            cart,
            orders,
            event_sender,
            payment_delay,
        }
    }

    /// Runs the checkout flow: validate, reject an empty cart, authorize the
    /// (simulated) payment, snapshot the cart into a new order, append it to
    /// the order store, clear the cart, and return the new order id.
    ///
    /// The cart is cleared only after the order is durably appended; a
    /// persistence failure leaves the cart intact. Validation and empty-cart
    /// rejections happen before any side effect.
    #[instrument(skip(self, form))]
    pub async fn place_order(&self, form: CheckoutForm) -> Result<String, ServiceError> {
        validate_checkout_form(&form).map_err(ServiceError::InvalidField)?;

        let items = self.cart.items().await;
        if items.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        // Total comes from the snapshot itself, so it always matches the
        // items the order records.
        let total_price: Decimal = items.iter().map(CartLineItem::line_total).sum();

        let authorization = self.authorize_payment(&form, total_price).await?;

        let order_id = generate_order_id();
        let order = build_order(order_id.clone(), items, total_price, &form);

        self.orders.add_order(order).await?;
        self.cart.clear().await?;

        self.event_sender
            .send_or_log(Event::CheckoutCompleted {
                order_id: order_id.clone(),
            })
            .await;

        info!(
            "Checkout completed: order {} (transaction {})",
            order_id, authorization.transaction_id
        );
        Ok(order_id)
    }

    /// Simulated payment authorization: a fixed delay standing in for an
    /// external gateway call, then approval.
    ///
    /// This step can fail independently of validation. Today it always
    /// succeeds; a real gateway integration fails through
    /// `ServiceError::PaymentFailed` (retryable) or
    /// `ServiceError::PaymentTimedOut`.
    async fn authorize_payment(
        &self,
        form: &CheckoutForm,
        amount: Decimal,
    ) -> Result<PaymentAuthorization, ServiceError> {
        sleep(self.payment_delay).await;

        info!(
            "Authorized {:?} payment of {}",
            form.payment_method, amount
        );
        Ok(PaymentAuthorization {
            transaction_id: Uuid::new_v4(),
            amount,
        })
    }
}

/// Same composition as the storefront's `ORD-<timestamp>` ids, taken at
/// microsecond resolution so per-process collisions are negligible.
fn generate_order_id() -> String {
    format!("ORD-{}", Utc::now().timestamp_micros())
}

/// Builds the immutable order record from the cart snapshot and form data.
/// The card number is masked to its last four digits; card fields are only
/// retained for card payment; the CVV is never retained.
fn build_order(
    id: String,
    items: Vec<CartLineItem>,
    total_price: Decimal,
    form: &CheckoutForm,
) -> Order {
    let (card_number, expiry_date) = match form.payment_method {
        PaymentMethod::Card => (
            form.card_number.as_deref().map(mask_card_number),
            form.expiry_date.clone(),
        ),
        PaymentMethod::CashOnDelivery => (None, None),
    };

    Order {
        id,
        items,
        total_price,
        customer_name: form.customer_name.clone(),
        customer_email: form.customer_email.clone(),
        customer_phone: form.customer_phone.clone(),
        address: form.address.clone(),
        city: form.city.clone(),
        postal_code: form.postal_code.clone(),
        payment_method: form.payment_method,
        card_number,
        expiry_date,
        status: OrderStatus::Completed,
        created_at: Utc::now(),
    }
}

/// Masks a card number to its last four digits, left-padded with `*` to the
/// full 16-character width.
fn mask_card_number(raw: &str) -> String {
    let card_digits = digits(raw);
    let last_four = &card_digits[card_digits.len().saturating_sub(4)..];
    format!("{:*>16}", last_four)
}
