use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::checkout::CheckoutField;
use crate::storage::StorageError;

/// Standard JSON error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Bad Request")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Machine-readable detail, e.g. the checkout field that failed validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A checkout form field failed validation. User-correctable; carries the
    /// exact offending field so the form can highlight it.
    #[error("Validation failed: {0}")]
    InvalidField(CheckoutField),

    /// Checkout attempted with no line items. User-correctable.
    #[error("Cannot checkout with an empty cart")]
    EmptyCart,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Reserved: the simulated payment step always succeeds today, but a real
    /// gateway integration fails through here, distinctly from validation.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// Reserved: a gateway timeout must stay distinguishable from a decline.
    #[error("Payment timed out")]
    PaymentTimedOut,

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EmptyCart | Self::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            Self::PaymentTimedOut => StatusCode::GATEWAY_TIMEOUT,
            Self::StorageError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message suitable for HTTP responses. Internal failures return a
    /// generic message; the specifics go to the logs only.
    pub fn response_message(&self) -> String {
        match self {
            Self::StorageError(_) | Self::InternalError(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Machine-readable detail for user-correctable errors.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidField(field) => Some(field.as_str().to_string()),
            _ => None,
        }
    }
}

/// API error type for HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            ApiError::ServiceError(err) => {
                (err.status_code(), err.response_message(), err.detail())
            }
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_maps_to_unprocessable_entity_with_field_detail() {
        let err = ServiceError::InvalidField(CheckoutField::CustomerPhone);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.detail(), Some("customer_phone".to_string()));
    }

    #[test]
    fn empty_cart_is_a_bad_request() {
        assert_eq!(
            ServiceError::EmptyCart.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn storage_errors_do_not_leak_details() {
        let err = ServiceError::InternalError("disk on fire".to_string());
        assert_eq!(err.response_message(), "Internal server error");
    }

    #[test]
    fn payment_failures_are_distinct_from_validation() {
        let payment = ServiceError::PaymentFailed("declined".to_string());
        let timeout = ServiceError::PaymentTimedOut;
        assert_eq!(payment.status_code(), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }
}
