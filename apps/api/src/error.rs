use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use templar_core::AppError;
use tracing::error;

mod types;

pub use types::{ErrorResponse, FieldValidationResponse};

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Validation(_) | AppError::InvalidField { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "request failed");
        }

        let validations = match &self.0 {
            AppError::InvalidField { field, detail } => vec![FieldValidationResponse {
                field: field.clone(),
                detail: detail.clone(),
            }],
            _ => Vec::new(),
        };

        let payload = Json(ErrorResponse::new(self.0.to_string(), validations));

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
