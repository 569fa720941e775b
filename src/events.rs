use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::models::cart::ProductId;

/// Events emitted by the commerce services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated(ProductId),
    ProductUpdated(ProductId),
    ProductDeleted(ProductId),

    // Cart events
    CartItemAdded {
        product_id: ProductId,
        quantity: i32,
    },
    CartItemUpdated {
        product_id: ProductId,
        quantity: i32,
    },
    CartItemRemoved {
        product_id: ProductId,
    },
    CartCleared,

    // Checkout events
    OrderCreated(String),
    CheckoutCompleted {
        order_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging delivery failures instead of surfacing them.
    /// Event delivery is never allowed to fail a commerce operation.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            error!("Dropping undeliverable event: {}", err);
        }
    }
}

/// Drains the event channel, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderCreated(order_id) => info!("Order created: {}", order_id),
            Event::CheckoutCompleted { order_id } => {
                info!("Checkout completed: order {}", order_id);
            }
            other => debug!("Event: {:?}", other),
        }
    }

    info!("Event channel closed; stopping event processing loop");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        sender
            .send(Event::OrderCreated("ORD-1".to_string()))
            .await
            .expect("send");

        match rx.recv().await {
            Some(Event::OrderCreated(id)) => assert_eq!(id, "ORD-1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let sender = EventSender::new(tx);

        // Must not panic or return an error to the caller.
        sender.send_or_log(Event::CartCleared).await;
    }
}
