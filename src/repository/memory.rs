use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{AuditEntry, Booking, BookingStatus, Payment, PaymentStatus, Property};
use crate::error::{AppError, AppResult};

use super::MarketplaceStore;

/// In-process store used when no database is configured, and by the test
/// suite. Same conditional-update contract as the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    properties: HashMap<Uuid, Property>,
    bookings: HashMap<Uuid, Booking>,
    payments: HashMap<Uuid, Payment>,
    audit: Vec<AuditEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit rows recorded so far. Test-visible surface only.
    pub fn audit_len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").audit.len()
    }
}

#[async_trait]
impl MarketplaceStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_property(&self, property: &Property) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.properties.insert(property.id, property.clone());
        Ok(())
    }

    async fn get_property(&self, id: Uuid) -> AppResult<Property> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .properties
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Property {id} not found.")))
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> AppResult<Booking> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .bookings
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found.")))
    }

    async fn update_booking(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let current = inner
            .bookings
            .get(&booking.id)
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found.", booking.id)))?;
        if current.status != expected {
            return Err(AppError::IllegalTransition(format!(
                "Booking {} was updated concurrently (status is {}, expected {}).",
                booking.id,
                current.status.as_str(),
                expected.as_str()
            )));
        }
        inner.bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn list_bookings_for_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.tenant_id == tenant_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn list_confirmed_ending_before(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.status == BookingStatus::Confirmed && b.check_out < date)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.check_out.cmp(&b.check_out));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn get_payment(&self, id: Uuid) -> AppResult<Payment> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Payment {id} not found.")))
    }

    async fn update_payment(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let current = inner
            .payments
            .get(&payment.id)
            .ok_or_else(|| AppError::NotFound(format!("Payment {} not found.", payment.id)))?;
        if current.status != expected {
            return Err(AppError::IllegalTransition(format!(
                "Payment {} was updated concurrently (status is {}, expected {}).",
                payment.id,
                current.status.as_str(),
                expected.as_str()
            )));
        }
        inner.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn open_payment_for_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .payments
            .values()
            .find(|p| p.booking_id == booking_id && p.status.is_open())
            .cloned())
    }

    async fn list_payments_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<PaymentStatus>,
        limit: i64,
    ) -> AppResult<Vec<Payment>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        let mut rows: Vec<Payment> = inner
            .payments
            .values()
            .filter(|p| p.owner_id == owner_id)
            .filter(|p| status.map(|s| p.status == s).unwrap_or(true))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn append_audit(&self, entry: &AuditEntry) -> AppResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.audit.push(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conditional_update_rejects_stale_writer() {
        let store = MemoryStore::new();
        let booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 3).unwrap(),
        );
        store.insert_booking(&booking).await.unwrap();

        let mut confirmed = booking.clone();
        confirmed.status = BookingStatus::Confirmed;
        store
            .update_booking(&confirmed, BookingStatus::Pending)
            .await
            .unwrap();

        // A second writer still holding the PENDING snapshot loses.
        let mut cancelled = booking.clone();
        cancelled.status = BookingStatus::Cancelled;
        let err = store
            .update_booking(&cancelled, BookingStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::IllegalTransition(_)));

        let stored = store.get_booking(booking.id).await.unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn open_payment_lookup_ignores_terminal_payments() {
        let store = MemoryStore::new();
        let booking_id = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let owner = Uuid::new_v4();

        let mut rejected = Payment::new(booking_id, tenant, owner, 1_000, "INR");
        rejected.status = PaymentStatus::Rejected;
        store.insert_payment(&rejected).await.unwrap();
        assert!(store
            .open_payment_for_booking(booking_id)
            .await
            .unwrap()
            .is_none());

        let open = Payment::new(booking_id, tenant, owner, 1_000, "INR");
        store.insert_payment(&open).await.unwrap();
        let found = store
            .open_payment_for_booking(booking_id)
            .await
            .unwrap()
            .expect("open payment");
        assert_eq!(found.id, open.id);
    }
}
