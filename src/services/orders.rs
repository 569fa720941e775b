use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use crate::{
    errors::ServiceError,
    events::{Event, EventSender},
    models::order::Order,
    storage::{self, SessionStore, ORDERS_DOCUMENT},
};

/// Append-only store of committed orders.
///
/// Orders are created exclusively by the checkout orchestrator and never
/// mutated afterwards; this store offers append and point lookup only.
pub struct OrderService {
    orders: RwLock<Vec<Order>>,
    store: Arc<dyn SessionStore>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    /// Loads the order list from the session store, resetting to empty on a
    /// corrupt document (logged, record discarded).
    pub async fn load(store: Arc<dyn SessionStore>, event_sender: Arc<EventSender>) -> Self {
        let orders = match storage::load_document::<Vec<Order>>(store.as_ref(), ORDERS_DOCUMENT)
            .await
        {
            Ok(Some(orders)) => orders,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("Discarding corrupt orders document: {}", err);
                if let Err(err) = store.remove(ORDERS_DOCUMENT).await {
                    warn!("Failed to remove corrupt orders document: {}", err);
                }
                Vec::new()
            }
        };

        Self {
            orders: RwLock::new(orders),
            store,
            event_sender,
        }
    }

    /// Appends a committed order and persists the full order list before
    /// returning. Id uniqueness is the checkout orchestrator's guarantee;
    /// no collision check happens here.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn add_order(&self, order: Order) -> Result<(), ServiceError> {
        let order_id = order.id.clone();

        let mut orders = self.orders.write().await;
        orders.push(order);
        self.persist(&orders).await?;
        drop(orders);

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id.clone()))
            .await;

        info!("Committed order {}", order_id);
        Ok(())
    }

    /// Linear lookup by id. Absence is an expected condition (e.g. a stale
    /// confirmation link after storage was cleared), not an error.
    pub async fn get_order(&self, order_id: &str) -> Option<Order> {
        self.orders
            .read()
            .await
            .iter()
            .find(|order| order.id == order_id)
            .cloned()
    }

    /// All committed orders, oldest first.
    pub async fn list_orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }

    async fn persist(&self, orders: &[Order]) -> Result<(), ServiceError> {
        storage::save_document(self.store.as_ref(), ORDERS_DOCUMENT, orders)
            .await
            .map_err(ServiceError::from)
    }
}
