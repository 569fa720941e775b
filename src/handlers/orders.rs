use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};

use crate::{errors::ApiError, handlers::common::success_response, AppState};

pub fn order_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

async fn list_orders(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    success_response(state.services.orders.list_orders().await)
}

/// Point lookup for the order confirmation page. A stale id (for example
/// after the session store was cleared) is a plain 404, not a failure.
async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Order {} not found", id)))?;

    Ok(success_response(order))
}
