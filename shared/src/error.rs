use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{0}")]
    ForbiddenOperation(String),
    #[error("an active booking already exists for this customer, service, date and slot")]
    DuplicateBooking,
    #[error("no technicians are available for the requested date and slot")]
    NoTechniciansAvailable,
    #[error("the booking has already been processed")]
    AlreadyProcessed,
    #[error("the booking has already been confirmed")]
    AlreadyConfirmed,
    #[error("the cancellation window has expired")]
    WindowExpired,
    #[error("insufficient coin balance: required {required}, current {current}")]
    InsufficientBalance { required: i64, current: i64 },
    #[error(transparent)]
    ValidationError(#[from] garde::Report),
    #[error("database operation error: {0}")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("transaction error: {0}")]
    TransactionError(#[source] sqlx::Error),
    #[error("no rows affected: {0}")]
    NoRowsAffectedError(String),
    #[error("key value store error: {0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("conversion error: {0}")]
    ConversionEntityError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::UnprocessableEntity(_)
            | AppError::NoTechniciansAvailable
            | AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
            AppError::ForbiddenOperation(_) => StatusCode::FORBIDDEN,
            AppError::DuplicateBooking
            | AppError::AlreadyProcessed
            | AppError::AlreadyConfirmed
            | AppError::WindowExpired => StatusCode::CONFLICT,
            AppError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::SpecificOperationError(_)
            | AppError::TransactionError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::ConversionEntityError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(
                error.cause_chain = ?self,
                error.message = %self,
                "unexpected error happened"
            );
        }

        // InsufficientBalance carries the amounts so the client can
        // branch into a top-up flow instead of a blind retry.
        let body = match &self {
            AppError::InsufficientBalance { required, current } => json!({
                "error": self.to_string(),
                "required": required,
                "current": current,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status_code, Json(body)).into_response()
    }
}
