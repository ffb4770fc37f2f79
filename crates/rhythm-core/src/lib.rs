//! Rhythm Core Library
//!
//! Recurring-transaction pattern detection and forecasting:
//! - Normalization of heterogeneous ledger records
//! - Interval statistics and deterministic frequency classification
//! - Optional external AI classifier with strict response validation
//! - Next-occurrence prediction per frequency bucket
//! - Incremental single-transaction updates against cached patterns
//! - Invalidation-driven per-user result cache
//!
//! The engine is a library-style component: it accepts already-fetched
//! transaction data, computes synchronously, and treats the external
//! classifier as optional — every path degrades to a deterministic
//! fallback.

pub mod ai;
pub mod cache;
pub mod classify;
pub mod config;
pub mod detect;
pub mod engine;
pub mod error;
pub mod incremental;
pub mod intervals;
pub mod models;
pub mod normalize;
pub mod predict;

pub use ai::{
    ClassifierBackend, ClassifierClient, ClassifierEntry, MockClassifier, OllamaClassifier,
    SeriesSummary,
};
pub use cache::{CachedPatterns, PatternCache};
pub use classify::{classify_interval, validate_entry, ClassifierVerdict, ValidPattern};
pub use config::PatternConfig;
pub use detect::{full_scan, ScanResult};
pub use engine::{LedgerReader, PatternEngine};
pub use error::{Error, Result};
pub use incremental::apply_incremental;
pub use intervals::{interval_stats, IntervalStats};
pub use models::{
    Frequency, PatternCandidate, RawTransaction, SeriesKey, TransactionKind, TransactionRecord,
    UpdateOutcome,
};
pub use normalize::{normalize, normalize_all};
pub use predict::next_expected;
