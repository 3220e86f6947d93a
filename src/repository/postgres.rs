use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{AuditEntry, Booking, BookingStatus, Payment, PaymentStatus, Property};
use crate::error::{AppError, AppResult};

use super::MarketplaceStore;

/// Postgres-backed store. Statuses are stored as their canonical
/// SCREAMING_SNAKE_CASE strings; every update is guarded on the expected
/// current status so concurrent writers serialize (see `migrations/`).
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn booking_from_row(row: &PgRow) -> AppResult<Booking> {
    let status_raw: String = row.try_get("status")?;
    let status = BookingStatus::parse(&status_raw)
        .ok_or_else(|| AppError::Internal(format!("Unknown booking status '{status_raw}'.")))?;
    Ok(Booking {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        property_id: row.try_get("property_id")?,
        check_in: row.try_get("check_in")?,
        check_out: row.try_get("check_out")?,
        status,
        cancel_reason: row.try_get("cancel_reason")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn payment_from_row(row: &PgRow) -> AppResult<Payment> {
    let status_raw: String = row.try_get("status")?;
    let status = PaymentStatus::parse(&status_raw)
        .ok_or_else(|| AppError::Internal(format!("Unknown payment status '{status_raw}'.")))?;
    Ok(Payment {
        id: row.try_get("id")?,
        booking_id: row.try_get("booking_id")?,
        tenant_id: row.try_get("tenant_id")?,
        owner_id: row.try_get("owner_id")?,
        amount_minor: row.try_get("amount_minor")?,
        currency: row.try_get("currency")?,
        upi_reference: row.try_get("upi_reference")?,
        status,
        verified_by: row.try_get("verified_by")?,
        verified_at: row.try_get("verified_at")?,
        rejection_note: row.try_get("rejection_note")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn property_from_row(row: &PgRow) -> AppResult<Property> {
    Ok(Property {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        price_per_night_minor: row.try_get("price_per_night_minor")?,
        capacity: row.try_get("capacity")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MarketplaceStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn insert_property(&self, property: &Property) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO properties (id, owner_id, name, price_per_night_minor, capacity, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(property.id)
        .bind(property.owner_id)
        .bind(&property.name)
        .bind(property.price_per_night_minor)
        .bind(property.capacity)
        .bind(property.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_property(&self, id: Uuid) -> AppResult<Property> {
        let row = sqlx::query("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Property {id} not found.")))?;
        property_from_row(&row)
    }

    async fn insert_booking(&self, booking: &Booking) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO bookings
                 (id, tenant_id, property_id, check_in, check_out, status,
                  cancel_reason, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(booking.id)
        .bind(booking.tenant_id)
        .bind(booking.property_id)
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.status.as_str())
        .bind(&booking.cancel_reason)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_booking(&self, id: Uuid) -> AppResult<Booking> {
        let row = sqlx::query("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {id} not found.")))?;
        booking_from_row(&row)
    }

    async fn update_booking(&self, booking: &Booking, expected: BookingStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE bookings
             SET check_in = $1, check_out = $2, status = $3, cancel_reason = $4, updated_at = $5
             WHERE id = $6 AND status = $7",
        )
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.status.as_str())
        .bind(&booking.cancel_reason)
        .bind(booking.updated_at)
        .bind(booking.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::IllegalTransition(format!(
                "Booking {} was updated concurrently (expected status {}).",
                booking.id,
                expected.as_str()
            )));
        }
        Ok(())
    }

    async fn list_bookings_for_tenant(
        &self,
        tenant_id: Uuid,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query(
            "SELECT * FROM bookings WHERE tenant_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn list_confirmed_ending_before(
        &self,
        date: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query(
            "SELECT * FROM bookings
             WHERE status = 'CONFIRMED' AND check_out < $1
             ORDER BY check_out ASC
             LIMIT $2",
        )
        .bind(date)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(booking_from_row).collect()
    }

    async fn insert_payment(&self, payment: &Payment) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO payments
                 (id, booking_id, tenant_id, owner_id, amount_minor, currency,
                  upi_reference, status, verified_by, verified_at, rejection_note,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(payment.id)
        .bind(payment.booking_id)
        .bind(payment.tenant_id)
        .bind(payment.owner_id)
        .bind(payment.amount_minor)
        .bind(&payment.currency)
        .bind(&payment.upi_reference)
        .bind(payment.status.as_str())
        .bind(payment.verified_by)
        .bind(payment.verified_at)
        .bind(&payment.rejection_note)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_payment(&self, id: Uuid) -> AppResult<Payment> {
        let row = sqlx::query("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payment {id} not found.")))?;
        payment_from_row(&row)
    }

    async fn update_payment(&self, payment: &Payment, expected: PaymentStatus) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE payments
             SET upi_reference = $1, status = $2, verified_by = $3, verified_at = $4,
                 rejection_note = $5, updated_at = $6
             WHERE id = $7 AND status = $8",
        )
        .bind(&payment.upi_reference)
        .bind(payment.status.as_str())
        .bind(payment.verified_by)
        .bind(payment.verified_at)
        .bind(&payment.rejection_note)
        .bind(payment.updated_at)
        .bind(payment.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::IllegalTransition(format!(
                "Payment {} was updated concurrently (expected status {}).",
                payment.id,
                expected.as_str()
            )));
        }
        Ok(())
    }

    async fn open_payment_for_booking(&self, booking_id: Uuid) -> AppResult<Option<Payment>> {
        let row = sqlx::query(
            "SELECT * FROM payments
             WHERE booking_id = $1
               AND status IN ('AWAITING_PAYMENT', 'AWAITING_OWNER_VERIFICATION')
             LIMIT 1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(payment_from_row).transpose()
    }

    async fn list_payments_for_owner(
        &self,
        owner_id: Uuid,
        status: Option<PaymentStatus>,
        limit: i64,
    ) -> AppResult<Vec<Payment>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    "SELECT * FROM payments
                     WHERE owner_id = $1 AND status = $2
                     ORDER BY created_at DESC
                     LIMIT $3",
                )
                .bind(owner_id)
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    "SELECT * FROM payments
                     WHERE owner_id = $1
                     ORDER BY created_at DESC
                     LIMIT $2",
                )
                .bind(owner_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(payment_from_row).collect()
    }

    async fn append_audit(&self, entry: &AuditEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor_id, action, entity, entity_id, detail, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.entity)
        .bind(entry.entity_id)
        .bind(&entry.detail)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
