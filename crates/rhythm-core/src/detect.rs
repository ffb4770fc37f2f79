//! Full-scan pattern detection
//!
//! Groups normalized transactions into series, runs interval statistics,
//! frequency classification, and next-occurrence prediction per series, and
//! assembles the display-ready result list. External classifier entries, when
//! present for a series, take over classification after validation; series
//! without one fall back to the deterministic threshold path.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::ai::types::ClassifierEntry;
use crate::classify::{classify_interval, validate_entry, ClassifierVerdict};
use crate::config::PatternConfig;
use crate::intervals::interval_stats;
use crate::models::{Frequency, PatternCandidate, SeriesKey, TransactionRecord};
use crate::predict::next_expected;

/// Output of one full scan.
///
/// Carries every series as a candidate, including `Unclassified` ones:
/// rejected and insufficient-data series stay inspectable for diagnostics
/// and give the incremental updater its occurrence bookkeeping. Only
/// `visible` results ever reach callers.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// All candidates in deterministic series-key order
    pub candidates: Vec<PatternCandidate>,
    pub computed_at: DateTime<Utc>,
}

impl ScanResult {
    /// The publicly exposable candidates: classified, at or above the
    /// confidence floor, highest confidence first, capped at the configured
    /// ceiling. Ordering is deterministic (confidence, then series key).
    pub fn visible(&self, config: &PatternConfig) -> Vec<PatternCandidate> {
        let mut visible: Vec<PatternCandidate> = self
            .candidates
            .iter()
            .filter(|c| {
                c.frequency != Frequency::Unclassified && c.confidence >= config.confidence_floor
            })
            .cloned()
            .collect();

        visible.sort_by(|a, b| {
            b.confidence
                .total_cmp(&a.confidence)
                .then_with(|| a.series_key().cmp(&b.series_key()))
        });
        visible.truncate(config.max_results);
        visible
    }
}

/// Run a full scan over normalized records.
///
/// `external` holds raw classifier output, possibly empty; entries are
/// matched to series by case-insensitive title plus kind, with
/// later-processed duplicates discarded rather than merged. Series whose
/// external entry fails validation are rejected outright — they do not fall
/// back to the threshold table.
pub fn full_scan(
    records: &[TransactionRecord],
    external: &[ClassifierEntry],
    config: &PatternConfig,
) -> ScanResult {
    let mut groups: BTreeMap<SeriesKey, Vec<&TransactionRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.series_key()).or_default().push(record);
    }

    let mut entries: BTreeMap<SeriesKey, &ClassifierEntry> = BTreeMap::new();
    for entry in external {
        let key = SeriesKey::new(&entry.title, entry.kind);
        if entries.contains_key(&key) {
            debug!(title = %entry.title, "Discarding duplicate classifier entry");
            continue;
        }
        entries.insert(key, entry);
    }

    let mut candidates = Vec::with_capacity(groups.len());
    for (key, mut group) in groups {
        group.sort_by_key(|r| r.occurred_at);
        candidates.push(build_candidate(&key, &group, entries.get(&key).copied(), config));
    }

    let classified = candidates
        .iter()
        .filter(|c| c.frequency != Frequency::Unclassified)
        .count();
    info!(
        series = candidates.len(),
        classified, "Full pattern scan complete"
    );

    ScanResult {
        candidates,
        computed_at: Utc::now(),
    }
}

/// Build the candidate for one series from its date-sorted records
fn build_candidate(
    key: &SeriesKey,
    group: &[&TransactionRecord],
    entry: Option<&ClassifierEntry>,
    config: &PatternConfig,
) -> PatternCandidate {
    let occurrences: Vec<DateTime<Utc>> = group.iter().map(|r| r.occurred_at).collect();
    // Display fields come from the most recent occurrence
    let latest = group[group.len() - 1];
    let last_at = latest.occurred_at;

    let stats = interval_stats(&occurrences, config.min_occurrences);
    let average_interval_days = stats.as_ref().map(|s| s.average_interval_days);

    let (frequency, confidence, next, reason) = match entry {
        Some(entry) => match validate_entry(entry, config) {
            ClassifierVerdict::Valid(valid) => {
                let next = valid
                    .next_expected
                    .or_else(|| next_expected(valid.frequency, last_at));
                let reason = format!(
                    "classifier labeled {} (confidence {:.2})",
                    valid.frequency.as_str(),
                    valid.confidence
                );
                (valid.frequency, valid.confidence, next, reason)
            }
            ClassifierVerdict::Rejected(why) => {
                debug!(title = %key.title, "Classifier entry rejected: {}", why);
                (
                    Frequency::Unclassified,
                    0.0,
                    None,
                    format!("classifier rejected: {}", why),
                )
            }
        },
        None => match &stats {
            Some(stats) => {
                let frequency = classify_interval(stats.average_interval_days);
                let reason = format!(
                    "{} occurrences averaging {:.1} days apart",
                    stats.occurrence_count, stats.average_interval_days
                );
                (
                    frequency,
                    config.fallback_confidence,
                    next_expected(frequency, last_at),
                    reason,
                )
            }
            None => (
                Frequency::Unclassified,
                0.0,
                None,
                format!(
                    "insufficient data: {} occurrence(s), need {}",
                    occurrences.len(),
                    config.min_occurrences
                ),
            ),
        },
    };

    PatternCandidate {
        title: latest.title.clone(),
        kind: key.kind,
        category: latest.category.clone(),
        amount: latest.amount,
        occurrences,
        average_interval_days,
        frequency,
        confidence,
        next_expected: next,
        reason,
    }
}
