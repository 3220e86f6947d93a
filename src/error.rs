use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::domain::{Booking, Payment};

/// Application-wide error type. Every variant maps to a stable HTTP status
/// and a JSON `{"detail": ...}` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Check-out is not strictly after check-in, or check-in is in the past.
    #[error("{0}")]
    InvalidRange(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// A state-machine violation: the requested transition is not legal from
    /// the record's current status (including lost conditional updates).
    #[error("{0}")]
    IllegalTransition(String),

    /// A required field is missing or malformed (e.g. blank rejection note).
    #[error("{0}")]
    Validation(String),

    /// The payment update committed but the booking update did not (or vice
    /// versa). Carries both last-known records so the caller can reconcile
    /// on the next read.
    #[error("{message}")]
    PartialFailure {
        message: String,
        payment: Box<Payment>,
        booking: Option<Box<Booking>>,
    },

    #[error("{0}")]
    Dependency(String),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRange(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::IllegalTransition(_) => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::PartialFailure { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Dependency(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::PartialFailure {
                message,
                payment,
                booking,
            } => json!({
                "detail": message,
                "kind": "partial_failure",
                "payment": payment,
                "booking": booking,
            }),
            other => json!({ "detail": other.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, detail = %self, "request failed");
        }
        (status, Json(self.body())).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound("Record not found.".to_string()),
            other => Self::Dependency(format!("Database request failed: {other}")),
        }
    }
}
