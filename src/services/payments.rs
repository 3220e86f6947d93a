use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Principal;
use crate::config::AppConfig;
use crate::domain::{BookingStatus, Payment, PaymentStatus};
use crate::error::{AppError, AppResult};
use crate::repository::MarketplaceStore;
use crate::services::upi::UpiIntent;
use crate::services::{audit, pricing, upi};

/// Create a payment for a PENDING booking, locking in the amount the
/// Pricing Calculator yields for the booking's current dates, and build
/// the UPI intent the tenant will pay against.
pub async fn create_payment(
    store: &dyn MarketplaceStore,
    config: &AppConfig,
    principal: Principal,
    booking_id: Uuid,
) -> AppResult<(Payment, UpiIntent)> {
    let booking = store.get_booking(booking_id).await?;
    if booking.tenant_id != principal.id && !principal.is_admin() {
        return Err(AppError::Forbidden(
            "Only the booking's tenant can initiate payment.".to_string(),
        ));
    }
    if booking.status != BookingStatus::Pending {
        return Err(AppError::IllegalTransition(format!(
            "Payments can only be created for PENDING bookings (currently {}).",
            booking.status.as_str()
        )));
    }
    if let Some(open) = store.open_payment_for_booking(booking_id).await? {
        return Err(AppError::IllegalTransition(format!(
            "An active payment ({}) already exists for this booking.",
            open.status.as_str()
        )));
    }

    let property = store.get_property(booking.property_id).await?;
    let quote = pricing::quote(
        booking.check_in,
        booking.check_out,
        property.price_per_night_minor,
    )?;

    let payment = Payment::new(
        booking_id,
        booking.tenant_id,
        property.owner_id,
        quote.amount_minor,
        &config.default_currency,
    );
    store.insert_payment(&payment).await?;

    let note = format!("{} · {} nights", property.name, quote.nights);
    let intent = upi::build_intent(
        &config.upi_payee_vpa,
        &config.upi_payee_name,
        payment.amount_minor,
        &payment.currency,
        &note,
    );

    tracing::info!(
        payment_id = %payment.id,
        booking_id = %booking_id,
        amount_minor = payment.amount_minor,
        "payment created"
    );
    audit::record(
        store,
        principal.id,
        "create",
        "payments",
        payment.id,
        json!({ "booking_id": booking_id, "amount_minor": payment.amount_minor }),
    )
    .await;

    Ok((payment, intent))
}

/// Tenant declares "I paid", optionally attaching the free-text UPI
/// reference from their banking app.
///
/// Idempotent: re-submitting while the proof is already awaiting the
/// owner's decision is a no-op, so double-clicks and client retries are
/// harmless.
pub async fn submit_proof(
    store: &dyn MarketplaceStore,
    principal: Principal,
    payment_id: Uuid,
    upi_reference: Option<String>,
) -> AppResult<Payment> {
    let mut payment = store.get_payment(payment_id).await?;
    if payment.tenant_id != principal.id && !principal.is_admin() {
        return Err(AppError::Forbidden(
            "Only the paying tenant can submit payment proof.".to_string(),
        ));
    }

    match payment.status {
        PaymentStatus::AwaitingOwnerVerification => Ok(payment),
        PaymentStatus::AwaitingPayment => {
            if let Some(reference) = upi_reference.map(|r| r.trim().to_string()) {
                if !reference.is_empty() {
                    payment.upi_reference = Some(reference);
                }
            }
            payment.status = PaymentStatus::AwaitingOwnerVerification;
            payment.updated_at = Utc::now();
            store
                .update_payment(&payment, PaymentStatus::AwaitingPayment)
                .await?;

            audit::record(
                store,
                principal.id,
                "submit_proof",
                "payments",
                payment.id,
                json!({ "upi_reference": payment.upi_reference }),
            )
            .await;
            Ok(payment)
        }
        other => Err(AppError::IllegalTransition(format!(
            "This payment has already been decided ({}).",
            other.as_str()
        ))),
    }
}

/// VERIFIED → REFUNDED, by the owner who collected or an admin. Terminal.
pub async fn refund(
    store: &dyn MarketplaceStore,
    principal: Principal,
    payment_id: Uuid,
) -> AppResult<Payment> {
    let mut payment = store.get_payment(payment_id).await?;
    if payment.owner_id != principal.id && !principal.is_admin() {
        return Err(AppError::Forbidden(
            "Only the collecting owner or an admin can refund.".to_string(),
        ));
    }
    if payment.status != PaymentStatus::Verified {
        return Err(AppError::IllegalTransition(format!(
            "Only VERIFIED payments can be refunded (currently {}).",
            payment.status.as_str()
        )));
    }

    payment.status = PaymentStatus::Refunded;
    payment.updated_at = Utc::now();
    store
        .update_payment(&payment, PaymentStatus::Verified)
        .await?;

    audit::record(
        store,
        principal.id,
        "refund",
        "payments",
        payment.id,
        json!({ "amount_minor": payment.amount_minor }),
    )
    .await;

    Ok(payment)
}

pub async fn get_payment(
    store: &dyn MarketplaceStore,
    principal: Principal,
    payment_id: Uuid,
) -> AppResult<Payment> {
    let payment = store.get_payment(payment_id).await?;
    let may_view = payment.tenant_id == principal.id
        || payment.owner_id == principal.id
        || principal.is_admin();
    if !may_view {
        return Err(AppError::Forbidden(
            "You do not have access to this payment.".to_string(),
        ));
    }
    Ok(payment)
}

/// The owner's verification queue (or full history when no status filter
/// is given). Clients poll this — freshness is bounded by the poll
/// interval, not pushed.
pub async fn list_owner_payments(
    store: &dyn MarketplaceStore,
    principal: Principal,
    status: Option<PaymentStatus>,
    limit: i64,
) -> AppResult<Vec<Payment>> {
    store
        .list_payments_for_owner(principal.id, status, limit)
        .await
}
