use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use serde::Serialize;

use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error},
    services::CheckoutForm,
    AppState,
};

pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(place_order))
}

#[derive(Debug, Serialize)]
pub struct PlaceOrderResponse {
    pub order_id: String,
}

/// Runs the full checkout flow and returns the new order id.
///
/// Field-level validation lives in the checkout service, not in a request
/// extractor, so a failure reports the exact offending field with a 422.
async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(form): Json<CheckoutForm>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id = state
        .services
        .checkout
        .place_order(form)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(PlaceOrderResponse { order_id }))
}
