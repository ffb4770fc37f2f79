//! Interval statistics for one series
//!
//! Works on the ascending occurrence timeline of a single series and answers
//! one question: how far apart, on average, are consecutive occurrences?

use chrono::{DateTime, Utc};

/// Interval statistics for a series with enough history to analyze
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalStats {
    /// Mean of consecutive gaps, in whole days (each gap floored)
    pub average_interval_days: f64,
    pub occurrence_count: usize,
}

/// Compute interval statistics over ascending occurrence timestamps.
///
/// Returns `None` below `min_occurrences` — insufficient data, not an error;
/// the series is simply treated as non-recurring until more arrives. A gap is
/// the whole-day floor of the difference between consecutive timestamps, so
/// 29.9 days counts as 29. All occurrences on the same day yield an average
/// of 0.0, which the classifier maps to Daily.
pub fn interval_stats(
    occurrences: &[DateTime<Utc>],
    min_occurrences: usize,
) -> Option<IntervalStats> {
    if occurrences.len() < min_occurrences {
        return None;
    }

    let gaps: Vec<i64> = occurrences
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .collect();

    let average_interval_days = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;

    Some(IntervalStats {
        average_interval_days,
        occurrence_count: occurrences.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_requires_minimum_occurrences() {
        assert!(interval_stats(&[day(1)], 3).is_none());
        assert!(interval_stats(&[day(1), day(8)], 3).is_none());
        assert!(interval_stats(&[day(1), day(8), day(15)], 3).is_some());
    }

    #[test]
    fn test_weekly_average() {
        let stats = interval_stats(&[day(1), day(8), day(15), day(22)], 3).unwrap();
        assert_eq!(stats.average_interval_days, 7.0);
        assert_eq!(stats.occurrence_count, 4);
    }

    #[test]
    fn test_uneven_gaps_average_out() {
        // Gaps of 6 and 8 days average to 7
        let stats = interval_stats(&[day(1), day(7), day(15)], 3).unwrap();
        assert_eq!(stats.average_interval_days, 7.0);
    }

    #[test]
    fn test_gaps_floor_to_whole_days() {
        // 29 days and 22 hours between occurrences counts as 29
        let a = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 31, 10, 0, 0).unwrap();
        let c = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let stats = interval_stats(&[a, b, c], 3).unwrap();
        assert_eq!(stats.average_interval_days, 29.0);
    }

    #[test]
    fn test_same_day_occurrences_yield_zero() {
        let stats = interval_stats(&[day(5), day(5), day(5)], 3).unwrap();
        assert_eq!(stats.average_interval_days, 0.0);
    }
}
