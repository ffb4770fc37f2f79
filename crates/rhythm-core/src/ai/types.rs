//! Classifier wire types
//!
//! `SeriesSummary` is what the engine sends out; `ClassifierEntry` is what it
//! is willing to read back. Entries are deserialized leniently (optional
//! fields default) and then re-validated field by field before anything in
//! them is trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::TransactionKind;

/// Compact description of one series, sent to the external classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub title: String,
    pub kind: TransactionKind,
    pub occurrence_count: usize,
    /// Amount of the most recent occurrence
    pub last_amount: f64,
    /// Most recent occurrence dates, ascending (capped by the caller)
    pub recent_occurrences: Vec<DateTime<Utc>>,
}

/// One pattern entry as returned by the external classifier.
///
/// The frequency stays a raw string here on purpose: mapping it into a
/// `Frequency` is the validation step's job, and unrecognized labels must
/// reject the entry rather than deserialize-fail the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierEntry {
    pub title: String,
    #[serde(default)]
    pub amount: Option<f64>,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Option<String>,
    pub frequency: String,
    pub confidence: f64,
    #[serde(default, alias = "lastOccurrence")]
    pub last_occurrence: Option<String>,
    #[serde(default, alias = "nextExpected")]
    pub next_expected: Option<String>,
}
