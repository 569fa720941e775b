pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod models;
pub mod services;
pub mod storage;

use std::sync::Arc;

use axum::Router;

use crate::config::AppConfig;
use crate::events::EventSender;
use crate::handlers::AppServices;

/// Shared application state handed to every handler.
pub struct AppState {
    pub config: AppConfig,
    pub event_sender: Arc<EventSender>,
    pub services: AppServices,
}

/// The versioned API surface.
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products", handlers::products::product_routes())
        .nest("/cart", handlers::carts::cart_routes())
        .nest("/checkout", handlers::checkout::checkout_routes())
        .nest("/orders", handlers::orders::order_routes())
        .nest("/health", handlers::health::health_routes())
}
