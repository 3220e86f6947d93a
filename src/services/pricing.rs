use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Nights stayed and the total in minor units for those nights.
///
/// Recomputed on every date change — never cached — because both the
/// displayed total and the amount locked into a new payment derive from it.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quote {
    pub nights: i64,
    pub amount_minor: i64,
}

/// Whole nights between check-in and check-out. Fails when the range is
/// empty or inverted.
pub fn nights(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<i64> {
    let nights = (check_out - check_in).num_days();
    if nights <= 0 {
        return Err(AppError::InvalidRange(
            "Check-out must be after check-in.".to_string(),
        ));
    }
    Ok(nights)
}

pub fn quote(
    check_in: NaiveDate,
    check_out: NaiveDate,
    price_per_night_minor: i64,
) -> AppResult<Quote> {
    if price_per_night_minor <= 0 {
        return Err(AppError::Internal(
            "Property has a non-positive nightly rate.".to_string(),
        ));
    }
    let nights = nights(check_in, check_out)?;
    let amount_minor = nights.checked_mul(price_per_night_minor).ok_or_else(|| {
        AppError::Validation(format!(
            "Stay total overflows: {nights} nights at {price_per_night_minor} minor units."
        ))
    })?;
    Ok(Quote {
        nights,
        amount_minor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seven_nights_at_fifteen_thousand() {
        // ₹15,000/night in paise, 7 nights -> ₹1,05,000.
        let q = quote(date(2026, 1, 1), date(2026, 1, 8), 1_500_000).unwrap();
        assert_eq!(q.nights, 7);
        assert_eq!(q.amount_minor, 10_500_000);
    }

    #[test]
    fn shortening_the_stay_changes_the_next_quote() {
        let q = quote(date(2026, 1, 1), date(2026, 1, 4), 1_500_000).unwrap();
        assert_eq!(q.nights, 3);
        assert_eq!(q.amount_minor, 4_500_000);
    }

    #[test]
    fn single_night() {
        let q = quote(date(2026, 1, 1), date(2026, 1, 2), 99_900).unwrap();
        assert_eq!(q.nights, 1);
        assert_eq!(q.amount_minor, 99_900);
    }

    #[test]
    fn empty_and_inverted_ranges_fail() {
        for (ci, co) in [
            (date(2026, 1, 5), date(2026, 1, 5)),
            (date(2026, 1, 5), date(2026, 1, 4)),
        ] {
            match nights(ci, co) {
                Err(AppError::InvalidRange(_)) => {}
                other => panic!("expected InvalidRange, got {other:?}"),
            }
            assert!(quote(ci, co, 1_000).is_err());
        }
    }

    #[test]
    fn pathological_rate_fails_instead_of_wrapping() {
        match quote(date(2026, 1, 1), date(2026, 1, 8), i64::MAX / 2) {
            Err(AppError::Validation(_)) => {}
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        assert!(quote(date(2026, 1, 1), date(2026, 1, 2), 0).is_err());
        assert!(quote(date(2026, 1, 1), date(2026, 1, 2), -100).is_err());
    }
}
