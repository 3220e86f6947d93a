use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub mod bookings;
pub mod health;
pub mod payments;
pub mod properties;

fn parse_uuid(raw: &str, field: &str) -> Result<uuid::Uuid, crate::error::AppError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| crate::error::AppError::BadRequest(format!("Invalid {field}.")))
}

fn parse_date(raw: &str, field: &str) -> Result<chrono::NaiveDate, crate::error::AppError> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| crate::error::AppError::BadRequest(format!("Invalid {field} (YYYY-MM-DD).")))
}

pub fn v1_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .merge(properties::router())
        .merge(bookings::router())
        .merge(payments::router())
}
