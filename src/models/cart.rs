use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque catalog product identifier.
///
/// The catalog emits both string and numeric ids. Both forms deserialize into
/// the same normalized string representation, so cart and order logic compare
/// ids by value and never branch on how the catalog happened to encode them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for ProductId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(id) => Self(id),
            Raw::Number(id) => Self(id.to_string()),
        })
    }
}

/// One product-and-quantity row within the cart.
///
/// Display fields are copied from the catalog at add-to-cart time; the price
/// is captured by value and stays fixed for the life of the line item even if
/// the catalog price changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
    pub seller: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLineItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
