//! Transaction normalization
//!
//! The single place where the date-fallback rule lives: the explicit
//! transaction date wins when present and parseable, otherwise the
//! record-creation timestamp is used. Call sites never chain date fields
//! themselves.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{RawTransaction, TransactionRecord};

/// Category assigned when the ledger record carries none
const DEFAULT_CATEGORY: &str = "others";

/// Normalize one raw transaction.
///
/// Returns `Ok(None)` when the title is empty after trimming — such records
/// cannot participate in series grouping and are silently excluded, not an
/// error. Fails with `Error::InvalidRecord` only when both date fields are
/// absent or unparseable.
pub fn normalize(raw: &RawTransaction) -> Result<Option<TransactionRecord>> {
    let title = raw.title.trim();
    if title.is_empty() {
        debug!(id = %raw.id, "Dropping transaction with empty title");
        return Ok(None);
    }

    let occurred_at = raw
        .transaction_date
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| raw.created_at.as_deref().and_then(parse_timestamp))
        .ok_or_else(|| {
            Error::InvalidRecord(format!(
                "transaction {}: no parseable transaction date or creation timestamp",
                raw.id
            ))
        })?;

    let category = raw
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();

    Ok(Some(TransactionRecord {
        id: raw.id.clone(),
        title: title.to_string(),
        amount: raw.amount.abs(),
        kind: raw.kind,
        category,
        occurred_at,
    }))
}

/// Normalize a batch, excluding bad records and continuing.
///
/// A record that fails normalization is logged and skipped; the rest of the
/// set still gets processed.
pub fn normalize_all(raws: &[RawTransaction]) -> Vec<TransactionRecord> {
    let mut records = Vec::with_capacity(raws.len());
    for raw in raws {
        match normalize(raw) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(e) => warn!(id = %raw.id, "Excluding unnormalizable transaction: {}", e),
        }
    }
    records
}

/// Parse a ledger timestamp in any of the formats seen in the wild:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, `MM/DD/YYYY`.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    for format in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;

    fn raw(
        id: &str,
        title: &str,
        transaction_date: Option<&str>,
        created_at: Option<&str>,
    ) -> RawTransaction {
        RawTransaction {
            id: id.to_string(),
            title: title.to_string(),
            amount: -42.0,
            kind: TransactionKind::Expense,
            category: None,
            transaction_date: transaction_date.map(str::to_string),
            created_at: created_at.map(str::to_string),
        }
    }

    #[test]
    fn test_explicit_date_wins() {
        let record = normalize(&raw(
            "t1",
            "Netflix",
            Some("2024-03-05"),
            Some("2024-03-07T12:00:00Z"),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(record.occurred_at.to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }

    #[test]
    fn test_created_at_fallback() {
        let record = normalize(&raw("t2", "Netflix", None, Some("2024-03-07T12:00:00Z")))
            .unwrap()
            .unwrap();
        assert_eq!(record.occurred_at.to_rfc3339(), "2024-03-07T12:00:00+00:00");
    }

    #[test]
    fn test_unparseable_explicit_date_falls_back() {
        let record = normalize(&raw(
            "t3",
            "Netflix",
            Some("not a date"),
            Some("2024-03-07 12:00:00"),
        ))
        .unwrap()
        .unwrap();
        assert_eq!(record.occurred_at.to_rfc3339(), "2024-03-07T12:00:00+00:00");
    }

    #[test]
    fn test_no_usable_date_is_invalid_record() {
        let err = normalize(&raw("t4", "Netflix", None, None)).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));

        let err = normalize(&raw("t5", "Netflix", Some("garbage"), Some("also garbage")))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
    }

    #[test]
    fn test_empty_title_dropped_silently() {
        let result = normalize(&raw("t6", "   ", Some("2024-03-05"), None)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_amount_stored_non_negative() {
        let record = normalize(&raw("t7", "Netflix", Some("2024-03-05"), None))
            .unwrap()
            .unwrap();
        assert_eq!(record.amount, 42.0);
    }

    #[test]
    fn test_missing_category_defaults_to_others() {
        let record = normalize(&raw("t8", "Netflix", Some("2024-03-05"), None))
            .unwrap()
            .unwrap();
        assert_eq!(record.category, "others");
    }

    #[test]
    fn test_us_date_format() {
        let record = normalize(&raw("t9", "Netflix", Some("03/05/2024"), None))
            .unwrap()
            .unwrap();
        assert_eq!(record.occurred_at.to_rfc3339(), "2024-03-05T00:00:00+00:00");
    }

    #[test]
    fn test_normalize_all_skips_bad_records() {
        let raws = vec![
            raw("a", "Netflix", Some("2024-01-01"), None),
            raw("b", "", Some("2024-01-02"), None),
            raw("c", "Spotify", None, None),
            raw("d", "Rent", Some("2024-01-03"), None),
        ];
        let records = normalize_all(&raws);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Netflix");
        assert_eq!(records[1].title, "Rent");
    }
}
