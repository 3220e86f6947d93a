use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::{Booking, BookingStatus, Payment, PaymentStatus};
use crate::error::{AppError, AppResult};
use crate::repository::MarketplaceStore;
use crate::services::audit;

/// Both records as they stand after a decision, so the caller never has to
/// re-fetch to learn the outcome.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionOutcome {
    pub payment: Payment,
    pub booking: Booking,
}

/// The owner's verify/reject decision, serialized with the booking update
/// as one logical operation.
///
/// Validation and authorization run before any mutation. The payment
/// update is guarded on AWAITING_OWNER_VERIFICATION, so of two concurrent
/// decisions exactly one wins; the loser gets `IllegalTransition` and the
/// record is untouched. If the booking confirmation fails after the payment
/// commit, the caller gets `PartialFailure` carrying both last-known
/// records as the reconciliation hint.
pub async fn decide(
    store: &dyn MarketplaceStore,
    principal: Principal,
    payment_id: Uuid,
    verified: bool,
    note: Option<String>,
) -> AppResult<DecisionOutcome> {
    let mut payment = store.get_payment(payment_id).await?;

    if payment.owner_id != principal.id {
        return Err(AppError::Forbidden(
            "Only the property's owner can decide this payment.".to_string(),
        ));
    }
    if payment.status != PaymentStatus::AwaitingOwnerVerification {
        return Err(AppError::IllegalTransition(format!(
            "This payment has already been decided ({}).",
            payment.status.as_str()
        )));
    }

    if verified {
        verify(store, principal, payment).await
    } else {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                AppError::Validation("A rejection note is required.".to_string())
            })?;
        payment.rejection_note = Some(note);
        reject(store, principal, payment).await
    }
}

async fn verify(
    store: &dyn MarketplaceStore,
    principal: Principal,
    mut payment: Payment,
) -> AppResult<DecisionOutcome> {
    let now = Utc::now();
    payment.status = PaymentStatus::Verified;
    payment.verified_by = Some(principal.id);
    payment.verified_at = Some(now);
    payment.updated_at = now;
    store
        .update_payment(&payment, PaymentStatus::AwaitingOwnerVerification)
        .await?;

    audit::record(
        store,
        principal.id,
        "verify",
        "payments",
        payment.id,
        json!({ "booking_id": payment.booking_id }),
    )
    .await;

    // The payment is now VERIFIED on disk; from here on, any failure is a
    // partial outcome the caller must be able to reconcile.
    let mut booking = match store.get_booking(payment.booking_id).await {
        Ok(booking) => booking,
        Err(error) => {
            return Err(AppError::PartialFailure {
                message: format!(
                    "Payment {} is VERIFIED but its booking could not be loaded: {error}",
                    payment.id
                ),
                payment: Box::new(payment),
                booking: None,
            });
        }
    };

    match booking.status {
        BookingStatus::Pending => {
            booking.status = BookingStatus::Confirmed;
            booking.updated_at = now;
            if let Err(error) = store
                .update_booking(&booking, BookingStatus::Pending)
                .await
            {
                return Err(AppError::PartialFailure {
                    message: format!(
                        "Payment {} is VERIFIED but booking {} was not confirmed: {error}",
                        payment.id, booking.id
                    ),
                    payment: Box::new(payment),
                    booking: Some(Box::new(booking)),
                });
            }
            audit::record(
                store,
                principal.id,
                "confirm",
                "bookings",
                booking.id,
                json!({ "payment_id": payment.id }),
            )
            .await;
        }
        // A booking that was already confirmed — or cancelled before the
        // owner got around to verifying — is left as-is. The payment still
        // becomes VERIFIED. Known ordering anomaly, kept deliberately;
        // see DESIGN.md.
        other => {
            tracing::info!(
                booking_id = %booking.id,
                status = other.as_str(),
                payment_id = %payment.id,
                "verified payment for a booking no longer PENDING; booking left unchanged"
            );
        }
    }

    Ok(DecisionOutcome { payment, booking })
}

async fn reject(
    store: &dyn MarketplaceStore,
    principal: Principal,
    mut payment: Payment,
) -> AppResult<DecisionOutcome> {
    let now = Utc::now();
    payment.status = PaymentStatus::Rejected;
    payment.verified_by = Some(principal.id);
    payment.verified_at = Some(now);
    payment.updated_at = now;
    store
        .update_payment(&payment, PaymentStatus::AwaitingOwnerVerification)
        .await?;

    audit::record(
        store,
        principal.id,
        "reject",
        "payments",
        payment.id,
        json!({ "booking_id": payment.booking_id, "note": payment.rejection_note }),
    )
    .await;

    // A rejection never touches the booking: it stays PENDING and the
    // tenant can create a fresh payment.
    let booking = store.get_booking(payment.booking_id).await?;

    Ok(DecisionOutcome { payment, booking })
}
