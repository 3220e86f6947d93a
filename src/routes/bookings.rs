use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::auth::require_principal;
use crate::error::AppResult;
use crate::schemas::{
    clamp_limit_in_range, validate_input, CancelBookingInput, CreateBookingInput, ListQuery,
    UpdateBookingDatesInput,
};
use crate::services::bookings;
use crate::services::pricing::Quote;
use crate::state::AppState;

use super::{parse_date, parse_uuid};

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/bookings",
            axum::routing::post(create_booking).get(list_my_bookings),
        )
        .route("/bookings/{booking_id}", axum::routing::get(get_booking))
        .route(
            "/bookings/{booking_id}/dates",
            axum::routing::patch(update_dates),
        )
        .route(
            "/bookings/{booking_id}/cancel",
            axum::routing::post(cancel_booking),
        )
}

#[derive(Debug, serde::Deserialize)]
struct BookingPath {
    booking_id: String,
}

fn booking_json(booking: &crate::domain::Booking, quote: Option<Quote>) -> Value {
    let mut body = json!({
        "booking": booking,
        "effective_status": booking.effective_status(Utc::now().date_naive()),
    });
    if let Some(quote) = quote {
        body["quote"] = json!(quote);
    }
    body
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateBookingInput>,
) -> AppResult<impl IntoResponse> {
    let principal = require_principal(&state.config, &headers)?;
    let property_id = parse_uuid(&payload.property_id, "property id")?;
    let check_in = parse_date(&payload.check_in, "check-in date")?;
    let check_out = parse_date(&payload.check_out, "check-out date")?;

    let (booking, quote) = bookings::create_booking(
        state.store.as_ref(),
        principal,
        property_id,
        check_in,
        check_out,
        Utc::now().date_naive(),
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(booking_json(&booking, Some(quote))),
    ))
}

async fn list_my_bookings(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    let limit = clamp_limit_in_range(query.limit, 1, 500);
    let rows = bookings::list_my_bookings(state.store.as_ref(), principal, limit).await?;

    let today = Utc::now().date_naive();
    let data: Vec<Value> = rows
        .iter()
        .map(|b| {
            json!({
                "booking": b,
                "effective_status": b.effective_status(today),
            })
        })
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    let booking_id = parse_uuid(&path.booking_id, "booking id")?;
    let booking = bookings::get_booking(state.store.as_ref(), principal, booking_id).await?;
    Ok(Json(booking_json(&booking, None)))
}

async fn update_dates(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    headers: HeaderMap,
    Json(payload): Json<UpdateBookingDatesInput>,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    let booking_id = parse_uuid(&path.booking_id, "booking id")?;
    let check_in = parse_date(&payload.check_in, "check-in date")?;
    let check_out = parse_date(&payload.check_out, "check-out date")?;

    let (booking, quote) = bookings::update_booking_dates(
        state.store.as_ref(),
        principal,
        booking_id,
        check_in,
        check_out,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(booking_json(&booking, Some(quote))))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    headers: HeaderMap,
    Json(payload): Json<CancelBookingInput>,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    validate_input(&payload)?;
    let booking_id = parse_uuid(&path.booking_id, "booking id")?;

    let booking =
        bookings::cancel_booking(state.store.as_ref(), principal, booking_id, payload.reason)
            .await?;
    Ok(Json(booking_json(&booking, None)))
}
