use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::require_principal;
use crate::domain::PaymentStatus;
use crate::error::{AppError, AppResult};
use crate::schemas::{
    clamp_limit_in_range, validate_input, DecisionInput, ListQuery, SubmitProofInput,
};
use crate::services::{payments, verification};
use crate::state::AppState;

use super::parse_uuid;

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            "/bookings/{booking_id}/payments",
            axum::routing::post(create_payment),
        )
        .route("/payments", axum::routing::get(list_owner_payments))
        .route("/payments/{payment_id}", axum::routing::get(get_payment))
        .route(
            "/payments/{payment_id}/proof",
            axum::routing::post(submit_proof),
        )
        .route(
            "/payments/{payment_id}/decision",
            axum::routing::post(decide),
        )
        .route(
            "/payments/{payment_id}/refund",
            axum::routing::post(refund),
        )
}

#[derive(Debug, serde::Deserialize)]
struct BookingPath {
    booking_id: String,
}

#[derive(Debug, serde::Deserialize)]
struct PaymentPath {
    payment_id: String,
}

async fn create_payment(
    State(state): State<AppState>,
    Path(path): Path<BookingPath>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let principal = require_principal(&state.config, &headers)?;
    let booking_id = parse_uuid(&path.booking_id, "booking id")?;

    let (payment, intent) =
        payments::create_payment(state.store.as_ref(), &state.config, principal, booking_id)
            .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(json!({ "payment": payment, "upi": intent })),
    ))
}

async fn get_payment(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    let payment_id = parse_uuid(&path.payment_id, "payment id")?;
    let payment = payments::get_payment(state.store.as_ref(), principal, payment_id).await?;
    Ok(Json(json!({ "payment": payment })))
}

/// Owner's verification queue. Clients poll this endpoint; staleness is
/// bounded by the poll interval (≤30s in the reference frontend).
async fn list_owner_payments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;

    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(PaymentStatus::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown payment status '{raw}'."))
        })?),
    };
    let limit = clamp_limit_in_range(query.limit, 1, 500);

    let rows = payments::list_owner_payments(state.store.as_ref(), principal, status, limit).await?;
    Ok(Json(json!({ "data": rows })))
}

async fn submit_proof(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
    Json(payload): Json<SubmitProofInput>,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    validate_input(&payload)?;
    let payment_id = parse_uuid(&path.payment_id, "payment id")?;

    let payment = payments::submit_proof(
        state.store.as_ref(),
        principal,
        payment_id,
        payload.upi_reference,
    )
    .await?;
    Ok(Json(json!({ "payment": payment })))
}

async fn decide(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
    Json(payload): Json<DecisionInput>,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    validate_input(&payload)?;
    let payment_id = parse_uuid(&path.payment_id, "payment id")?;

    let outcome = verification::decide(
        state.store.as_ref(),
        principal,
        payment_id,
        payload.verified,
        payload.note,
    )
    .await?;
    Ok(Json(json!({
        "payment": outcome.payment,
        "booking": outcome.booking,
    })))
}

async fn refund(
    State(state): State<AppState>,
    Path(path): Path<PaymentPath>,
    headers: HeaderMap,
) -> AppResult<Json<Value>> {
    let principal = require_principal(&state.config, &headers)?;
    let payment_id = parse_uuid(&path.payment_id, "payment id")?;
    let payment = payments::refund(state.store.as_ref(), principal, payment_id).await?;
    Ok(Json(json!({ "payment": payment })))
}
