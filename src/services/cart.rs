use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::cart::{CartLineItem, ProductId},
    storage::{self, SessionStore, CART_DOCUMENT},
};

/// Cart store for the active session.
///
/// Owns the session's line items and the merge/quantity rules:
/// - at most one line item per product id; re-adding merges quantities
/// - a quantity update of zero or less removes the line item
///
/// Every mutation persists the full cart document before returning, so a
/// process restart resumes from the last committed state. Insertion order is
/// preserved for display; it carries no other meaning.
pub struct CartService {
    items: RwLock<Vec<CartLineItem>>,
    store: Arc<dyn SessionStore>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    /// Loads the cart from the session store. A corrupt document resets the
    /// cart to empty: the corruption is logged and the bad record discarded,
    /// never surfaced to the caller.
    pub async fn load(store: Arc<dyn SessionStore>, event_sender: Arc<EventSender>) -> Self {
        let items = match storage::load_document::<Vec<CartLineItem>>(store.as_ref(), CART_DOCUMENT)
            .await
        {
            Ok(Some(items)) => items,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("Discarding corrupt cart document: {}", err);
                if let Err(err) = store.remove(CART_DOCUMENT).await {
                    warn!("Failed to remove corrupt cart document: {}", err);
                }
                Vec::new()
            }
        };

        Self {
            items: RwLock::new(items),
            store,
            event_sender,
        }
    }

    /// Adds a line item, merging quantities when the product is already in
    /// the cart. No upper bound on quantity is enforced here; stock limits
    /// are a catalog display concern.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_item(&self, item: CartLineItem) -> Result<Vec<CartLineItem>, ServiceError> {
        let product_id = item.id.clone();
        let added_quantity = item.quantity;

        let mut items = self.items.write().await;
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                // Saturate so a huge re-add can never wrap below 1.
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => items.push(item),
        }
        let snapshot = items.clone();
        self.persist(&snapshot).await?;
        drop(items);

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                product_id: product_id.clone(),
                quantity: added_quantity,
            })
            .await;

        info!("Added {} x{} to cart", product_id, added_quantity);
        Ok(snapshot)
    }

    /// Removes the line item for `id`; a no-op when absent.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, id: &ProductId) -> Result<Vec<CartLineItem>, ServiceError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        let removed = items.len() != before;

        let snapshot = items.clone();
        self.persist(&snapshot).await?;
        drop(items);

        if removed {
            self.event_sender
                .send_or_log(Event::CartItemRemoved {
                    product_id: id.clone(),
                })
                .await;
        }
        Ok(snapshot)
    }

    /// Sets the quantity of a line item (replacement, not increment).
    /// A quantity of zero or less removes the line item instead.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        id: &ProductId,
        quantity: i32,
    ) -> Result<Vec<CartLineItem>, ServiceError> {
        if quantity <= 0 {
            return self.remove_item(id).await;
        }

        let mut items = self.items.write().await;
        let mut updated = false;
        if let Some(item) = items.iter_mut().find(|item| &item.id == id) {
            item.quantity = quantity;
            updated = true;
        }

        let snapshot = items.clone();
        self.persist(&snapshot).await?;
        drop(items);

        if updated {
            self.event_sender
                .send_or_log(Event::CartItemUpdated {
                    product_id: id.clone(),
                    quantity,
                })
                .await;
        }
        Ok(snapshot)
    }

    /// Empties the cart.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), ServiceError> {
        let mut items = self.items.write().await;
        items.clear();
        self.persist(&items).await?;
        drop(items);

        self.event_sender.send_or_log(Event::CartCleared).await;
        info!("Cleared cart");
        Ok(())
    }

    /// Current line items, in insertion order.
    pub async fn items(&self) -> Vec<CartLineItem> {
        self.items.read().await.clone()
    }

    /// Sum of price x quantity over all line items, recomputed from scratch
    /// at full precision. Two-decimal rounding is a presentation concern.
    pub async fn total_price(&self) -> Decimal {
        self.items
            .read()
            .await
            .iter()
            .map(CartLineItem::line_total)
            .sum()
    }

    /// Sum of quantities over all line items.
    pub async fn total_items(&self) -> i64 {
        self.items
            .read()
            .await
            .iter()
            .map(|item| i64::from(item.quantity))
            .sum()
    }

    async fn persist(&self, items: &[CartLineItem]) -> Result<(), ServiceError> {
        storage::save_document(self.store.as_ref(), CART_DOCUMENT, items)
            .await
            .map_err(ServiceError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySessionStore;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn event_sender() -> Arc<EventSender> {
        let (tx, _rx) = mpsc::channel(64);
        Arc::new(EventSender::new(tx))
    }

    fn line_item(id: &str, price: Decimal, quantity: i32) -> CartLineItem {
        CartLineItem {
            id: ProductId::new(id),
            name: format!("Product {}", id),
            price,
            quantity,
            seller: "FurniturePro".to_string(),
            category: "Home".to_string(),
            image: None,
        }
    }

    async fn empty_cart() -> CartService {
        CartService::load(Arc::new(InMemorySessionStore::new()), event_sender()).await
    }

    #[tokio::test]
    async fn adding_same_product_merges_quantities() {
        let cart = empty_cart().await;

        cart.add_item(line_item("1", dec!(10), 1)).await.expect("add");
        let items = cart.add_item(line_item("1", dec!(10), 3)).await.expect("add");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 4);
    }

    #[tokio::test]
    async fn merged_quantity_saturates_instead_of_wrapping() {
        let cart = empty_cart().await;

        cart.add_item(line_item("1", dec!(10), i32::MAX)).await.expect("add");
        let items = cart.add_item(line_item("1", dec!(10), i32::MAX)).await.expect("add");

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, i32::MAX);
    }

    #[tokio::test]
    async fn totals_follow_the_storefront_scenario() {
        let cart = empty_cart().await;
        cart.add_item(line_item("1", dec!(129.99), 2)).await.expect("add");
        cart.add_item(line_item("2", dec!(299.99), 1)).await.expect("add");

        assert_eq!(cart.total_price().await, dec!(559.97));
        assert_eq!(cart.total_items().await, 3);
    }

    #[tokio::test]
    async fn update_quantity_replaces_rather_than_increments() {
        let cart = empty_cart().await;
        cart.add_item(line_item("1", dec!(10), 5)).await.expect("add");

        let items = cart
            .update_quantity(&ProductId::new("1"), 2)
            .await
            .expect("update");
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn nonpositive_quantity_removes_the_line_item() {
        let cart = empty_cart().await;
        cart.add_item(line_item("1", dec!(10), 2)).await.expect("add");

        let items = cart
            .update_quantity(&ProductId::new("1"), 0)
            .await
            .expect("update");
        assert!(items.is_empty());

        cart.add_item(line_item("1", dec!(10), 2)).await.expect("add");
        let items = cart
            .update_quantity(&ProductId::new("1"), -3)
            .await
            .expect("update");
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn removing_an_absent_item_is_a_noop() {
        let cart = empty_cart().await;
        cart.add_item(line_item("1", dec!(10), 1)).await.expect("add");

        let items = cart
            .remove_item(&ProductId::new("missing"))
            .await
            .expect("remove");
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let cart = empty_cart().await;
        cart.add_item(line_item("1", dec!(10), 1)).await.expect("add");

        cart.clear().await.expect("clear");
        assert!(cart.items().await.is_empty());
        assert_eq!(cart.total_price().await, Decimal::ZERO);
    }
}
