//! Data models for the pattern engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction adds to or draws from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A transaction as it arrives from the ledger, before normalization.
///
/// Income and expense rows come from different storage collections with
/// slightly different field names; serde aliases absorb the variation so
/// the normalizer only deals with one shape. Both date fields are raw
/// strings because the ledger does not guarantee a single format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub category: Option<String>,
    /// Explicit transaction date, if the user set one
    #[serde(default, alias = "transactionDate", alias = "date")]
    pub transaction_date: Option<String>,
    /// Record-creation timestamp, the fallback date source
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// A normalized transaction. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: String,
    /// Original casing preserved for display; grouping is case-insensitive
    pub title: String,
    /// Non-negative
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
    /// Authoritative date: explicit transaction date, else creation timestamp
    pub occurred_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(&self.title, self.kind)
    }
}

/// Identity of a recurring series: case-insensitive title plus kind.
///
/// Ordered so that grouped iteration and output tiebreaks are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Trimmed, lower-cased title
    pub title: String,
    pub kind: TransactionKind,
}

impl SeriesKey {
    pub fn new(title: &str, kind: TransactionKind) -> Self {
        Self {
            title: title.trim().to_lowercase(),
            kind,
        }
    }
}

/// Recurrence frequency bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
    Yearly,
    /// No discoverable cadence (insufficient data or rejected)
    Unclassified,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::BiWeekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
            Self::Unclassified => "unclassified",
        }
    }

    /// Parse an externally supplied frequency label.
    ///
    /// Only the six recognized buckets are accepted; "irregular",
    /// "uncertain", "unknown", "sporadic", and any other string yield
    /// `None`. `Unclassified` is deliberately not parseable — an external
    /// classifier cannot hand us a non-answer and have it trusted.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "biweekly" | "bi-weekly" => Some(Self::BiWeekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// A detected (or rejected) recurring pattern for one series.
///
/// Candidates are fully derived from the transaction set: they carry no
/// identity beyond their series key and are replaced wholesale on each
/// recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternCandidate {
    /// Display title, original casing from the most recent occurrence
    pub title: String,
    pub kind: TransactionKind,
    pub category: String,
    /// Amount of the most recent occurrence
    pub amount: f64,
    /// Ascending occurrence timestamps
    pub occurrences: Vec<DateTime<Utc>>,
    /// Mean gap in whole days; only present with 3+ occurrences
    pub average_interval_days: Option<f64>,
    pub frequency: Frequency,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Always present once a frequency other than Unclassified is assigned
    pub next_expected: Option<DateTime<Utc>>,
    /// Human-readable explanation, diagnostic only
    pub reason: String,
}

impl PatternCandidate {
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(&self.title, self.kind)
    }

    /// Most recent occurrence, if any
    pub fn last_occurrence(&self) -> Option<DateTime<Utc>> {
        self.occurrences.last().copied()
    }
}

/// Outcome of an incremental single-transaction update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOutcome {
    /// Existing pattern cheaply extended in place
    Updated,
    /// A series crossed the occurrence minimum; full rescan flagged
    Created,
    /// Existing pattern contradicted (or state unknown); full rescan flagged
    Invalidated,
    /// Nothing to do
    Noop,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::Created => "created",
            Self::Invalidated => "invalidated",
            Self::Noop => "noop",
        }
    }
}
