use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    errors::ApiError,
    handlers::common::{map_service_error, success_response, validate_input},
    models::cart::{CartLineItem, ProductId},
    services::CartService,
    AppState,
};

pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_item))
        .route("/items/{id}", patch(update_quantity))
        .route("/items/{id}", delete(remove_item))
        .route("/clear", post(clear_cart))
}

/// Cart as rendered by the storefront: line items plus derived totals.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_price: Decimal,
    pub total_items: i64,
}

async fn cart_view(cart: &CartService) -> CartView {
    CartView {
        items: cart.items().await,
        total_price: cart.total_price().await,
        total_items: cart.total_items().await,
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub product_id: ProductId,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// Zero or less removes the line item.
    pub quantity: i32,
}

async fn get_cart(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    success_response(cart_view(&state.services.cart).await)
}

/// Copies the product's display fields into a new line item, merging with an
/// existing line for the same product.
async fn add_item(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .catalog
        .get_product(&payload.product_id)
        .await
        .map_err(map_service_error)?;

    let item = CartLineItem {
        id: product.id,
        name: product.name,
        price: product.price,
        quantity: payload.quantity,
        seller: product.seller,
        category: product.category,
        image: Some(product.image),
    };

    state
        .services
        .cart
        .add_item(item)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart_view(&state.services.cart).await))
}

async fn update_quantity(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .update_quantity(&ProductId::new(id), payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart_view(&state.services.cart).await))
}

async fn remove_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(&ProductId::new(id))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart_view(&state.services.cart).await))
}

async fn clear_cart(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .clear()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(cart_view(&state.services.cart).await))
}
