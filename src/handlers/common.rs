use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::errors::{ApiError, ServiceError};

/// 200 with a JSON body.
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 201 with a JSON body.
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Runs declarative request validation, mapping failures to a 400.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Invalid input: {}", e)))
}

pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}
