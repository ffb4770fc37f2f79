//! Frequency classification
//!
//! Two paths lead here. The deterministic fallback maps an average interval
//! onto a frequency bucket via fixed thresholds. The external-classifier path
//! validates a label and confidence somebody else produced; nothing from the
//! classifier is trusted until it passes the same contract.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ai::types::ClassifierEntry;
use crate::config::PatternConfig;
use crate::models::Frequency;
use crate::normalize::parse_timestamp;

/// Average intervals below this are Daily (covers the all-same-day case,
/// where the average is exactly zero)
const DAILY_CUTOFF_DAYS: f64 = 1.0;
/// Upper bound (inclusive) of the Weekly bucket
const WEEKLY_MAX_DAYS: f64 = 7.0;
/// Upper bound (inclusive) of the BiWeekly bucket
const BIWEEKLY_MAX_DAYS: f64 = 14.0;
/// Upper bound (inclusive) of the Monthly bucket
const MONTHLY_MAX_DAYS: f64 = 31.0;
/// Upper bound (inclusive) of the Quarterly bucket; beyond is Yearly
const QUARTERLY_MAX_DAYS: f64 = 90.0;

/// Map an average interval in days onto a frequency bucket.
///
/// Never returns `Unclassified`: by the time a series has interval
/// statistics it has met the occurrence minimum, and every non-negative
/// average lands in some bucket.
pub fn classify_interval(average_interval_days: f64) -> Frequency {
    if average_interval_days < DAILY_CUTOFF_DAYS {
        Frequency::Daily
    } else if average_interval_days <= WEEKLY_MAX_DAYS {
        Frequency::Weekly
    } else if average_interval_days <= BIWEEKLY_MAX_DAYS {
        Frequency::BiWeekly
    } else if average_interval_days <= MONTHLY_MAX_DAYS {
        Frequency::Monthly
    } else if average_interval_days <= QUARTERLY_MAX_DAYS {
        Frequency::Quarterly
    } else {
        Frequency::Yearly
    }
}

/// A classifier entry that survived validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPattern {
    pub frequency: Frequency,
    pub confidence: f64,
    /// Classifier-supplied prediction, already parsed; the predictor fills
    /// this in when absent
    pub next_expected: Option<DateTime<Utc>>,
}

/// Outcome of validating one external classifier entry.
///
/// A sum type instead of ad hoc string checks: downstream code matches on
/// this, never on raw labels.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierVerdict {
    Valid(ValidPattern),
    /// Why the entry was not trusted. Rejection is a filtering outcome,
    /// not an error; the series simply stays out of the results.
    Rejected(String),
}

/// Validate an external classifier entry against the engine contract.
///
/// The classifier is not assumed to obey its own contract, so every field
/// is checked: the frequency label must be one of the six recognized
/// buckets (no defaulting to a guess), and the confidence must be a finite
/// value in [0, 1] at or above the visibility floor.
pub fn validate_entry(entry: &ClassifierEntry, config: &PatternConfig) -> ClassifierVerdict {
    let frequency = match Frequency::from_label(&entry.frequency) {
        Some(f) => f,
        None => {
            return ClassifierVerdict::Rejected(format!(
                "unrecognized frequency label \"{}\"",
                entry.frequency
            ));
        }
    };

    if !entry.confidence.is_finite() || !(0.0..=1.0).contains(&entry.confidence) {
        return ClassifierVerdict::Rejected(format!(
            "confidence {} outside [0, 1]",
            entry.confidence
        ));
    }

    if entry.confidence < config.confidence_floor {
        return ClassifierVerdict::Rejected(format!(
            "confidence {:.2} below floor {:.2}",
            entry.confidence, config.confidence_floor
        ));
    }

    // An unparseable prediction distrusts only that field; the deterministic
    // predictor covers for it.
    let next_expected = entry.next_expected.as_deref().and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            debug!(title = %entry.title, "Ignoring unparseable classifier prediction: {}", raw);
        }
        parsed
    });

    ClassifierVerdict::Valid(ValidPattern {
        frequency,
        confidence: entry.confidence,
        next_expected,
    })
}
