use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::ProductId;

/// Image used when a product is created without one.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400x300";

const DEFAULT_RATING: f32 = 5.0;
const DEFAULT_STOCK: i32 = 10;

/// A catalog product as served to the storefront.
///
/// The cart copies `name`, `price`, `seller`, `category`, and `image` into
/// line items at add-to-cart time and never reads the catalog again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub seller: String,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
}

/// Input for creating a product. Optional fields get their defaults in
/// [`Product::from_new`], the catalog's single normalization point.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub seller: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

/// Partial update for a product; `Some` replaces, `None` keeps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub seller: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

impl Product {
    /// Normalizes a creation input into a full product record.
    ///
    /// This is the only place optional catalog fields are defaulted; consumers
    /// never fill in placeholders themselves.
    pub fn from_new(id: ProductId, input: NewProduct) -> Self {
        Self {
            id,
            name: input.name,
            price: input.price,
            category: input.category,
            seller: input.seller,
            image: input.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            rating: DEFAULT_RATING,
            reviews: 0,
            description: input.description,
            stock: Some(input.stock.unwrap_or(DEFAULT_STOCK)),
        }
    }

    pub fn apply(&mut self, patch: ProductPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(seller) = patch.seller {
            self.seller = seller;
        }
        if let Some(image) = patch.image {
            self.image = image;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(stock) = patch.stock {
            self.stock = Some(stock);
        }
    }
}
