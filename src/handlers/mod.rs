pub mod carts;
pub mod checkout;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;

use std::sync::Arc;
use std::time::Duration;

use crate::events::EventSender;
use crate::services::{CartService, CheckoutService, OrderService, ProductCatalogService};
use crate::storage::SessionStore;

/// The wired-up commerce services behind the HTTP surface.
pub struct AppServices {
    pub catalog: Arc<ProductCatalogService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub checkout: Arc<CheckoutService>,
}

impl AppServices {
    /// Builds the service graph, loading cart and order state from the
    /// session store.
    pub async fn load(
        store: Arc<dyn SessionStore>,
        event_sender: Arc<EventSender>,
        payment_delay: Duration,
    ) -> Self {
        let catalog = Arc::new(ProductCatalogService::new(event_sender.clone()));
        let cart = Arc::new(CartService::load(store.clone(), event_sender.clone()).await);
        let orders = Arc::new(OrderService::load(store, event_sender.clone()).await);
        let checkout = Arc::new(CheckoutService::new(
            cart.clone(),
            orders.clone(),
            event_sender,
            payment_delay,
        ));

        Self {
            catalog,
            cart,
            orders,
            checkout,
        }
    }
}
