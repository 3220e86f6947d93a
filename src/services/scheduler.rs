use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tokio::time::sleep;

use crate::domain::BookingStatus;
use crate::error::AppResult;
use crate::repository::MarketplaceStore;
use crate::state::AppState;

/// Background loop that periodically persists CONFIRMED → COMPLETED for
/// bookings whose check-out has passed. Display reads never wait on this:
/// `Booking::effective_status` derives the same answer on the fly.
pub async fn run_background_scheduler(state: AppState) {
    let interval = Duration::from_secs(state.config.completion_sweep_interval_seconds.max(30));
    tracing::info!(interval_seconds = interval.as_secs(), "completion sweep started");

    loop {
        sleep(interval).await;
        let today = Utc::now().date_naive();
        match sweep_completed(state.store.as_ref(), today, 200).await {
            Ok(0) => {}
            Ok(count) => tracing::info!(count, "sweep: bookings moved to COMPLETED"),
            Err(error) => tracing::warn!(error = %error, "completion sweep failed"),
        }
    }
}

/// One sweep pass. A booking cancelled between listing and update simply
/// loses the conditional write and is skipped.
pub async fn sweep_completed(
    store: &dyn MarketplaceStore,
    today: NaiveDate,
    limit: i64,
) -> AppResult<u64> {
    let due = store.list_confirmed_ending_before(today, limit).await?;
    let mut completed = 0;
    for mut booking in due {
        booking.status = BookingStatus::Completed;
        booking.updated_at = Utc::now();
        match store
            .update_booking(&booking, BookingStatus::Confirmed)
            .await
        {
            Ok(()) => completed += 1,
            Err(error) => {
                tracing::debug!(booking_id = %booking.id, error = %error, "sweep skipped booking");
            }
        }
    }
    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Booking;
    use crate::repository::memory::MemoryStore;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn sweep_completes_only_past_confirmed_bookings() {
        let store = MemoryStore::new();

        let mut past = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date(2026, 1, 1),
            date(2026, 1, 4),
        );
        past.status = BookingStatus::Confirmed;
        store.insert_booking(&past).await.unwrap();

        let mut ongoing = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date(2026, 2, 1),
            date(2026, 2, 10),
        );
        ongoing.status = BookingStatus::Confirmed;
        store.insert_booking(&ongoing).await.unwrap();

        let pending = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date(2026, 1, 1),
            date(2026, 1, 2),
        );
        store.insert_booking(&pending).await.unwrap();

        let completed = sweep_completed(&store, date(2026, 2, 5), 100).await.unwrap();
        assert_eq!(completed, 1);

        assert_eq!(
            store.get_booking(past.id).await.unwrap().status,
            BookingStatus::Completed
        );
        assert_eq!(
            store.get_booking(ongoing.id).await.unwrap().status,
            BookingStatus::Confirmed
        );
        assert_eq!(
            store.get_booking(pending.id).await.unwrap().status,
            BookingStatus::Pending
        );
    }

    #[tokio::test]
    async fn checkout_day_itself_does_not_complete() {
        let store = MemoryStore::new();
        let mut booking = Booking::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            date(2026, 3, 1),
            date(2026, 3, 5),
        );
        booking.status = BookingStatus::Confirmed;
        store.insert_booking(&booking).await.unwrap();

        // `list_confirmed_ending_before` is strict: the guest may still be
        // checking out today.
        let completed = sweep_completed(&store, date(2026, 3, 5), 100).await.unwrap();
        assert_eq!(completed, 0);
    }
}
