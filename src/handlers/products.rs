use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    errors::ApiError,
    handlers::common::{created_response, map_service_error, success_response, validate_input},
    models::cart::ProductId,
    models::product::{NewProduct, ProductPatch},
    AppState,
};

pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/", post(create_product))
        .route("/{id}", get(get_product))
        .route("/{id}", put(update_product))
        .route("/{id}", delete(delete_product))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub price: Decimal,
    #[validate(length(min = 1))]
    pub category: String,
    #[validate(length(min = 1))]
    pub seller: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub stock: Option<i32>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(req: CreateProductRequest) -> Self {
        NewProduct {
            name: req.name,
            price: req.price,
            category: req.category,
            seller: req.seller,
            image: req.image,
            description: req.description,
            stock: req.stock,
        }
    }
}

async fn list_products(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    success_response(state.services.catalog.list_products().await)
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get_product(&ProductId::new(id))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .catalog
        .create_product(payload.into())
        .await
        .map_err(map_service_error)?;
    Ok(created_response(product))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .update_product(&ProductId::new(id), patch)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}

/// Deletes a product and echoes the removed record back.
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .delete_product(&ProductId::new(id))
        .await
        .map_err(map_service_error)?;
    Ok(success_response(product))
}
