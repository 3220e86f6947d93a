use chrono::{NaiveDate, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::auth::{Principal, Role};
use crate::domain::{Booking, BookingStatus, PaymentStatus};
use crate::error::{AppError, AppResult};
use crate::repository::MarketplaceStore;
use crate::services::{audit, pricing};
use crate::services::pricing::Quote;

/// Validate a requested stay against today's date. Retroactive bookings
/// are never allowed, at creation or on edit.
fn validate_stay(today: NaiveDate, check_in: NaiveDate, check_out: NaiveDate) -> AppResult<()> {
    if check_in < today {
        return Err(AppError::InvalidRange(
            "Check-in cannot be in the past.".to_string(),
        ));
    }
    pricing::nights(check_in, check_out)?;
    Ok(())
}

pub async fn create_booking(
    store: &dyn MarketplaceStore,
    principal: Principal,
    property_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> AppResult<(Booking, Quote)> {
    if principal.role != Role::Tenant {
        return Err(AppError::Forbidden(
            "Only tenants can create bookings.".to_string(),
        ));
    }
    validate_stay(today, check_in, check_out)?;

    let property = store.get_property(property_id).await?;
    let quote = pricing::quote(check_in, check_out, property.price_per_night_minor)?;

    let booking = Booking::new(principal.id, property_id, check_in, check_out);
    store.insert_booking(&booking).await?;

    tracing::info!(
        booking_id = %booking.id,
        property_id = %property_id,
        nights = quote.nights,
        "booking created"
    );
    audit::record(
        store,
        principal.id,
        "create",
        "bookings",
        booking.id,
        json!({ "check_in": check_in, "check_out": check_out, "amount_minor": quote.amount_minor }),
    )
    .await;

    Ok((booking, quote))
}

/// Replace the trip dates of a PENDING booking.
///
/// An unpaid AWAITING_PAYMENT payment is superseded (rejected with a note)
/// so its locked-in amount can never go stale; a payment whose proof is
/// already awaiting the owner's decision blocks the edit until decided.
pub async fn update_booking_dates(
    store: &dyn MarketplaceStore,
    principal: Principal,
    booking_id: Uuid,
    check_in: NaiveDate,
    check_out: NaiveDate,
    today: NaiveDate,
) -> AppResult<(Booking, Quote)> {
    let mut booking = store.get_booking(booking_id).await?;
    if booking.tenant_id != principal.id && !principal.is_admin() {
        return Err(AppError::Forbidden(
            "Only the booking's tenant can change its dates.".to_string(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(AppError::IllegalTransition(format!(
            "Dates can only change while the booking is PENDING (currently {}).",
            booking.status.as_str()
        )));
    }
    validate_stay(today, check_in, check_out)?;

    if let Some(mut open) = store.open_payment_for_booking(booking_id).await? {
        match open.status {
            PaymentStatus::AwaitingPayment => {
                let now = Utc::now();
                open.status = PaymentStatus::Rejected;
                open.rejection_note = Some(
                    "Superseded: booking dates changed before payment was submitted.".to_string(),
                );
                open.verified_by = Some(principal.id);
                open.verified_at = Some(now);
                open.updated_at = now;
                store
                    .update_payment(&open, PaymentStatus::AwaitingPayment)
                    .await?;
                audit::record(
                    store,
                    principal.id,
                    "supersede",
                    "payments",
                    open.id,
                    json!({ "booking_id": booking_id }),
                )
                .await;
            }
            _ => {
                return Err(AppError::IllegalTransition(
                    "A submitted payment proof is awaiting the owner's decision; \
                     it must be decided before dates can change."
                        .to_string(),
                ));
            }
        }
    }

    booking.check_in = check_in;
    booking.check_out = check_out;
    booking.updated_at = Utc::now();
    store
        .update_booking(&booking, BookingStatus::Pending)
        .await?;

    // Amount always derives from the current dates; no caching.
    let property = store.get_property(booking.property_id).await?;
    let quote = pricing::quote(check_in, check_out, property.price_per_night_minor)?;

    audit::record(
        store,
        principal.id,
        "update_dates",
        "bookings",
        booking.id,
        json!({ "check_in": check_in, "check_out": check_out, "amount_minor": quote.amount_minor }),
    )
    .await;

    Ok((booking, quote))
}

pub async fn cancel_booking(
    store: &dyn MarketplaceStore,
    principal: Principal,
    booking_id: Uuid,
    reason: Option<String>,
) -> AppResult<Booking> {
    let mut booking = store.get_booking(booking_id).await?;
    let property = store.get_property(booking.property_id).await?;

    let may_cancel = booking.tenant_id == principal.id
        || property.owner_id == principal.id
        || principal.is_admin();
    if !may_cancel {
        return Err(AppError::Forbidden(
            "Only the tenant, the owner or an admin can cancel this booking.".to_string(),
        ));
    }

    let previous = booking.status;
    if !previous.allows_transition_to(BookingStatus::Cancelled) {
        return Err(AppError::IllegalTransition(format!(
            "Booking is already {} and cannot be cancelled.",
            previous.as_str()
        )));
    }

    booking.status = BookingStatus::Cancelled;
    booking.cancel_reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
    booking.updated_at = Utc::now();
    store.update_booking(&booking, previous).await?;

    audit::record(
        store,
        principal.id,
        "cancel",
        "bookings",
        booking.id,
        json!({ "from": previous.as_str(), "reason": booking.cancel_reason }),
    )
    .await;

    Ok(booking)
}

pub async fn get_booking(
    store: &dyn MarketplaceStore,
    principal: Principal,
    booking_id: Uuid,
) -> AppResult<Booking> {
    let booking = store.get_booking(booking_id).await?;
    let property = store.get_property(booking.property_id).await?;
    let may_view = booking.tenant_id == principal.id
        || property.owner_id == principal.id
        || principal.is_admin();
    if !may_view {
        return Err(AppError::Forbidden(
            "You do not have access to this booking.".to_string(),
        ));
    }
    Ok(booking)
}

pub async fn list_my_bookings(
    store: &dyn MarketplaceStore,
    principal: Principal,
    limit: i64,
) -> AppResult<Vec<Booking>> {
    store.list_bookings_for_tenant(principal.id, limit).await
}
