use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::cart::ProductId,
    models::product::{NewProduct, Product, ProductPatch},
};

/// In-memory product catalog, seeded with the launch assortment.
///
/// The catalog is the read side of add-to-cart: the storefront picks a
/// product here and the cart copies its display fields into a line item.
pub struct ProductCatalogService {
    products: RwLock<Vec<Product>>,
    event_sender: Arc<EventSender>,
}

impl ProductCatalogService {
    pub fn new(event_sender: Arc<EventSender>) -> Self {
        Self {
            products: RwLock::new(seed_products()),
            event_sender,
        }
    }

    /// All products, in catalog order.
    pub async fn list_products(&self) -> Vec<Product> {
        self.products.read().await.clone()
    }

    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        self.products
            .read()
            .await
            .iter()
            .find(|product| &product.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Creates a product with a timestamp-derived id, defaulting the optional
    /// display fields.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: NewProduct) -> Result<Product, ServiceError> {
        let id = ProductId::new(Utc::now().timestamp_millis().to_string());
        let product = Product::from_new(id.clone(), input);

        let mut products = self.products.write().await;
        products.push(product.clone());
        drop(products);

        self.event_sender
            .send_or_log(Event::ProductCreated(id.clone()))
            .await;

        info!("Created product {} ({})", id, product.name);
        Ok(product)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<Product, ServiceError> {
        let mut products = self.products.write().await;
        let product = products
            .iter_mut()
            .find(|product| &product.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        product.apply(patch);
        let updated = product.clone();
        drop(products);

        self.event_sender
            .send_or_log(Event::ProductUpdated(id.clone()))
            .await;
        Ok(updated)
    }

    /// Removes a product, returning the deleted record.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Product, ServiceError> {
        let mut products = self.products.write().await;
        let position = products
            .iter()
            .position(|product| &product.id == id)
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let deleted = products.remove(position);
        drop(products);

        self.event_sender
            .send_or_log(Event::ProductDeleted(id.clone()))
            .await;

        info!("Deleted product {}", id);
        Ok(deleted)
    }
}

/// Launch assortment served before any seller has created a product.
fn seed_products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new("1"),
            name: "Modern Sofa".to_string(),
            price: dec!(129.99),
            category: "Home".to_string(),
            seller: "FurniturePro".to_string(),
            image: "https://images.unsplash.com/photo-1555041469-a586c61ea9bc?w=400".to_string(),
            rating: 4.5,
            reviews: 320,
            description: Some("Comfortable three-seat sofa with washable covers".to_string()),
            stock: Some(15),
        },
        Product {
            id: ProductId::new("2"),
            name: "Wooden Dining Table".to_string(),
            price: dec!(299.99),
            category: "Home".to_string(),
            seller: "WoodWorks".to_string(),
            image: "https://images.unsplash.com/photo-1533090481720-856c6e3c1fdc?w=400".to_string(),
            rating: 4.8,
            reviews: 150,
            description: Some("Solid oak table seating six".to_string()),
            stock: Some(8),
        },
        Product {
            id: ProductId::new("3"),
            name: "Office Chair Pro".to_string(),
            price: dec!(199.99),
            category: "Home".to_string(),
            seller: "OfficeHub".to_string(),
            image: "https://images.unsplash.com/photo-1580480055273-228ff5388ef8?w=400".to_string(),
            rating: 4.7,
            reviews: 450,
            description: Some("Ergonomic chair with adjustable lumbar support".to_string()),
            stock: Some(20),
        },
    ]
}
