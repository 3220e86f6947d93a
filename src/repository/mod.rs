pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{AuditEntry, Booking, BookingStatus, Payment, PaymentStatus, Property};
use crate::error::AppResult;

/// Persistence seam for the booking-payment core.
///
/// Updates are conditional on the record's expected current status, so two
/// racing writers cannot both win: the loser gets `IllegalTransition` and
/// must re-read. Backed by Postgres in production and by an in-process map
/// when no database is configured (dev, tests).
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Cheap liveness probe for the health endpoint.
    async fn ping(&self) -> AppResult<()>;

    async fn insert_property(&self, property: &Property) -> AppResult<()>;
    async fn get_property(&self, id: Uuid) -> AppResult<Property>;

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()>;
    async fn get_booking(&self, id: Uuid) -> AppResult<Booking>;
    /// Persist `booking`, guarded on the stored status still being
    /// `expected`.
    async fn update_booking(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()>;
    async fn list_bookings_for_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Booking>>;
    /// Confirmed bookings whose check-out is strictly before `date` — the
    /// completion sweep's work list.
    async fn list_confirmed_ending_before(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<Booking>>;

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()>;
    async fn get_payment(&self, id: Uuid) -> AppResult<Payment>;
    /// Persist `payment`, guarded on the stored status still being
    /// `expected`.
    async fn update_payment(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()>;
    /// The at-most-one payment for this booking still in a non-terminal
    /// state, if any.
    async fn open_payment_for_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>>;
    async fn list_payments_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<PaymentStatus>,
        limit: i64,
    ) -> AppResult<Vec<Payment>>;

    async fn append_audit(&self, entry: &AuditEntry) -> AppResult<()>;
}
