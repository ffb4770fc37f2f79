//! Next-occurrence prediction
//!
//! Each frequency bucket advances the most recent occurrence by a fixed
//! number of days. Monthly uses a flat 30 days rather than calendar-month
//! arithmetic so that predictions stay consistent with the 30-day interval
//! averages the classifier buckets on.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::models::Frequency;

/// Days added when the primary offset cannot produce a valid date
const FALLBACK_OFFSET_DAYS: i64 = 30;

/// Fixed day offset for a frequency bucket
fn offset_days(frequency: Frequency) -> Option<i64> {
    match frequency {
        Frequency::Daily => Some(1),
        Frequency::Weekly => Some(7),
        Frequency::BiWeekly => Some(14),
        Frequency::Monthly => Some(30),
        Frequency::Quarterly => Some(90),
        Frequency::Yearly => Some(365),
        Frequency::Unclassified => None,
    }
}

/// Predict the expected next occurrence after the most recent one.
///
/// Returns `None` only for `Unclassified`. If the bucket offset overflows
/// the representable date range, the prediction falls back to
/// `last + 30 days` instead of propagating an error; if even that fails,
/// the last occurrence itself is returned. The fallback can mask a
/// classifier-supplied frequency near the date-range edge, which is
/// accepted behavior.
pub fn next_expected(frequency: Frequency, last: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let days = offset_days(frequency)?;

    if let Some(next) = last.checked_add_signed(Duration::days(days)) {
        return Some(next);
    }

    warn!(
        frequency = frequency.as_str(),
        "Offset of {} days overflowed; falling back to +{} days",
        days,
        FALLBACK_OFFSET_DAYS
    );
    Some(
        last.checked_add_signed(Duration::days(FALLBACK_OFFSET_DAYS))
            .unwrap_or(last),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_fixed_offsets() {
        let last = date(2024, 3, 1);
        assert_eq!(
            next_expected(Frequency::Daily, last),
            Some(date(2024, 3, 2))
        );
        assert_eq!(
            next_expected(Frequency::Weekly, last),
            Some(date(2024, 3, 8))
        );
        assert_eq!(
            next_expected(Frequency::BiWeekly, last),
            Some(date(2024, 3, 15))
        );
        assert_eq!(
            next_expected(Frequency::Monthly, last),
            Some(date(2024, 3, 31))
        );
        assert_eq!(
            next_expected(Frequency::Quarterly, last),
            Some(date(2024, 5, 30))
        );
        assert_eq!(
            next_expected(Frequency::Yearly, last),
            Some(date(2025, 3, 1))
        );
    }

    #[test]
    fn test_unclassified_has_no_prediction() {
        assert_eq!(next_expected(Frequency::Unclassified, date(2024, 3, 1)), None);
    }

    #[test]
    fn test_overflow_falls_back_to_thirty_days() {
        // Close enough to the end of the representable range that +365
        // overflows while +30 still fits
        let last = DateTime::<Utc>::MAX_UTC - Duration::days(40);
        let next = next_expected(Frequency::Yearly, last).unwrap();
        assert_eq!(next, last + Duration::days(30));
    }

    #[test]
    fn test_double_overflow_returns_last() {
        // Even the fallback offset overflows; prediction degrades to the
        // last occurrence rather than erroring
        let last = DateTime::<Utc>::MAX_UTC - Duration::days(2);
        let next = next_expected(Frequency::Monthly, last).unwrap();
        assert_eq!(next, last);
    }
}
