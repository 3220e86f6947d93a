use serde::Deserialize;
use validator::Validate;

use crate::error::AppError;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input
        .validate()
        .map_err(|errors| AppError::Validation(format!("Validation failed: {errors}")))
}

fn default_limit_100() -> i64 {
    100
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePropertyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1))]
    pub price_per_night_minor: i64,
    #[validate(range(min = 1, max = 64))]
    pub capacity: i32,
}

/// Dates arrive as `YYYY-MM-DD` strings and are parsed at the route
/// boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingInput {
    pub property_id: String,
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBookingDatesInput {
    pub check_in: String,
    pub check_out: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CancelBookingInput {
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitProofInput {
    /// Free-text reference from the tenant's UPI app. Stored opaque,
    /// never validated against any registry.
    #[validate(length(max = 255))]
    pub upi_reference: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DecisionInput {
    pub verified: bool,
    /// Required when `verified` is false.
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    #[serde(default = "default_limit_100")]
    pub limit: i64,
}

pub fn clamp_limit_in_range(limit: i64, minimum: i64, maximum: i64) -> i64 {
    limit.clamp(minimum, maximum)
}
