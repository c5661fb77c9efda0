use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tripnest_booking::BookingError;
use tripnest_catalog::{InventoryError, ProductError};
use tripnest_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    PaymentFailed(String),
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::Unauthorized("Authentication required".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PaymentFailed(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::Internal(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(_) => AppError::NotFound(err.to_string()),
            CoreError::Validation(msg) => AppError::Validation(msg),
            CoreError::FullyBooked(_)
            | CoreError::Inventory(_)
            | CoreError::Booking(_)
            | CoreError::Product(_) => AppError::Validation(err.to_string()),
            CoreError::Payment(msg) => AppError::PaymentFailed(msg),
            CoreError::Storage(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
