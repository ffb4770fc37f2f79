//! Incremental pattern updates
//!
//! A single newly-added transaction usually does not justify re-scanning the
//! whole history. This module decides, against the cached candidate set,
//! whether the new occurrence cheaply confirms an existing pattern or has to
//! flag a full rescan. It is a performance optimization only: every failure
//! path degrades to "rescan", never to silently stale data.

use tracing::{debug, warn};

use crate::config::PatternConfig;
use crate::error::Result;
use crate::intervals::interval_stats;
use crate::models::{Frequency, PatternCandidate, RawTransaction, UpdateOutcome};
use crate::normalize::normalize;
use crate::predict::next_expected;

/// Apply one new transaction to a user's cached candidate set.
///
/// Mutates candidates in place on the cheap path. `Created` and
/// `Invalidated` tell the caller the cache must be marked stale; `Updated`
/// and `Noop` leave it fresh. Errors are swallowed and reported as
/// `Invalidated` so a rescan corrects whatever went wrong.
pub fn apply_incremental(
    candidates: &mut Vec<PatternCandidate>,
    raw: &RawTransaction,
    config: &PatternConfig,
) -> UpdateOutcome {
    match try_apply(candidates, raw, config) {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!(id = %raw.id, "Incremental update failed, flagging rescan: {}", e);
            UpdateOutcome::Invalidated
        }
    }
}

fn try_apply(
    candidates: &mut Vec<PatternCandidate>,
    raw: &RawTransaction,
    config: &PatternConfig,
) -> Result<UpdateOutcome> {
    let record = match normalize(raw)? {
        Some(record) => record,
        // Empty-title records never participate in grouping
        None => return Ok(UpdateOutcome::Noop),
    };
    let key = record.series_key();

    let Some(candidate) = candidates.iter_mut().find(|c| c.series_key() == key) else {
        // First sighting of this series: track it internally, nothing to
        // report yet (one occurrence can never classify)
        debug!(title = %record.title, "Tracking new series from incremental update");
        candidates.push(PatternCandidate {
            title: record.title.clone(),
            kind: record.kind,
            category: record.category.clone(),
            amount: record.amount,
            occurrences: vec![record.occurred_at],
            average_interval_days: None,
            frequency: Frequency::Unclassified,
            confidence: 0.0,
            next_expected: None,
            reason: format!("insufficient data: 1 occurrence(s), need {}", config.min_occurrences),
        });
        return Ok(UpdateOutcome::Noop);
    };

    if candidate.frequency == Frequency::Unclassified {
        let is_latest = candidate
            .occurrences
            .last()
            .map_or(true, |last| record.occurred_at >= *last);
        candidate.occurrences.push(record.occurred_at);
        candidate.occurrences.sort();
        if is_latest {
            candidate.title = record.title.clone();
            candidate.category = record.category.clone();
            candidate.amount = record.amount;
        }

        if candidate.occurrences.len() >= config.min_occurrences {
            // Enough history now for a real classification pass
            debug!(title = %record.title, "Series crossed occurrence minimum, flagging rescan");
            return Ok(UpdateOutcome::Created);
        }
        return Ok(UpdateOutcome::Noop);
    }

    // Classified candidate: check the new gap against the known cadence
    let Some(average) = candidate.average_interval_days else {
        // Externally classified before reaching the occurrence minimum;
        // no average to test the gap against
        return Ok(UpdateOutcome::Invalidated);
    };
    let last = candidate.last_occurrence().ok_or_else(|| {
        crate::error::Error::InvalidData(format!(
            "classified candidate {:?} has no occurrences",
            key
        ))
    })?;

    let gap = (record.occurred_at - last).num_days() as f64;
    let tolerance = average * config.gap_tolerance_ratio;

    if gap < 0.0 || (gap - average).abs() > tolerance {
        debug!(
            title = %record.title,
            gap, average, "Gap outside tolerance, invalidating pattern"
        );
        return Ok(UpdateOutcome::Invalidated);
    }

    candidate.occurrences.push(record.occurred_at);
    candidate.average_interval_days = interval_stats(&candidate.occurrences, config.min_occurrences)
        .map(|s| s.average_interval_days)
        .or(candidate.average_interval_days);
    candidate.title = record.title.clone();
    candidate.category = record.category.clone();
    candidate.amount = record.amount;
    candidate.next_expected = next_expected(candidate.frequency, record.occurred_at);

    debug!(
        title = %record.title,
        frequency = candidate.frequency.as_str(),
        "Pattern extended in place"
    );
    Ok(UpdateOutcome::Updated)
}
