//! Pattern engine facade
//!
//! Ties the pipeline together for callers: ledger read, normalization,
//! optional external classification, full scan, cache. Exposes the two
//! operations the web backend consumes: `get_patterns` and
//! `notify_new_transaction`.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::ai::{ClassifierBackend, ClassifierClient, SeriesSummary};
use crate::cache::PatternCache;
use crate::config::PatternConfig;
use crate::detect::full_scan;
use crate::error::Result;
use crate::incremental::apply_incremental;
use crate::models::{PatternCandidate, RawTransaction, SeriesKey, UpdateOutcome};
use crate::normalize::normalize_all;

/// How many recent occurrence dates go into a classifier summary
const SUMMARY_OCCURRENCE_CAP: usize = 12;

/// Read access to the transaction ledger.
///
/// The engine performs its own normalization; implementations hand over
/// records as they exist in storage.
pub trait LedgerReader: Send + Sync {
    fn list_transactions(&self, user_id: &str) -> Result<Vec<RawTransaction>>;
}

/// The recurring-pattern engine.
///
/// Stateless computation over already-fetched data plus a per-user result
/// cache. Safe to share across request handlers; cache access serializes
/// internally and recomputation is idempotent.
pub struct PatternEngine<L: LedgerReader> {
    ledger: L,
    classifier: Option<ClassifierClient>,
    config: PatternConfig,
    cache: PatternCache,
}

impl<L: LedgerReader> PatternEngine<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            classifier: None,
            config: PatternConfig::default(),
            cache: PatternCache::new(),
        }
    }

    pub fn with_config(ledger: L, config: PatternConfig) -> Self {
        Self {
            ledger,
            classifier: None,
            config,
            cache: PatternCache::new(),
        }
    }

    pub fn with_classifier(ledger: L, classifier: ClassifierClient) -> Self {
        Self {
            ledger,
            classifier: Some(classifier),
            config: PatternConfig::default(),
            cache: PatternCache::new(),
        }
    }

    pub fn with_config_and_classifier(
        ledger: L,
        config: PatternConfig,
        classifier: ClassifierClient,
    ) -> Self {
        Self {
            ledger,
            classifier: Some(classifier),
            config,
            cache: PatternCache::new(),
        }
    }

    pub fn config(&self) -> &PatternConfig {
        &self.config
    }

    /// Whether the external classifier is configured and reachable
    pub async fn classifier_available(&self) -> bool {
        match &self.classifier {
            Some(classifier) => classifier.health_check().await,
            None => false,
        }
    }

    /// The user's detected patterns, filtered per the visibility contract.
    ///
    /// Serves the cache when an entry exists and nothing has invalidated it
    /// since; otherwise recomputes from the ledger. A failed recomputation
    /// propagates its error and leaves any previous cache entry untouched.
    pub async fn get_patterns(
        &self,
        user_id: &str,
        force_refresh: bool,
    ) -> Result<Vec<PatternCandidate>> {
        if !force_refresh {
            if let Some(entry) = self.cache.fresh(user_id)? {
                debug!(user_id, "Serving cached patterns");
                let result = crate::detect::ScanResult {
                    candidates: entry.candidates,
                    computed_at: entry.computed_at,
                };
                return Ok(result.visible(&self.config));
            }
        }

        let raws = self.ledger.list_transactions(user_id)?;
        let records = normalize_all(&raws);

        let external = match &self.classifier {
            Some(classifier) => {
                let summaries = build_summaries(&records);
                match classifier.classify_series(&summaries).await {
                    Ok(entries) => entries,
                    Err(e) => {
                        // The classifier is optional; degrade to the
                        // deterministic fallback
                        warn!(user_id, "Classifier unavailable, using fallback: {}", e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        let result = full_scan(&records, &external, &self.config);
        self.cache.store(user_id, &result)?;
        Ok(result.visible(&self.config))
    }

    /// Fold one newly-added transaction into the cached patterns.
    ///
    /// Never errors: anything that prevents a cheap in-place update comes
    /// back as `Invalidated`, and the next `get_patterns` call recomputes.
    pub fn notify_new_transaction(&self, user_id: &str, raw: &RawTransaction) -> UpdateOutcome {
        let applied = self.cache.with_entry(user_id, |entry| {
            let outcome = apply_incremental(&mut entry.candidates, raw, &self.config);
            if matches!(outcome, UpdateOutcome::Created | UpdateOutcome::Invalidated) {
                entry.stale = true;
            }
            outcome
        });

        match applied {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                // No cached state to update against; the next read does a
                // full scan anyway
                debug!(user_id, "No cache entry for incremental update");
                UpdateOutcome::Invalidated
            }
            Err(e) => {
                warn!(user_id, "Incremental update failed: {}", e);
                UpdateOutcome::Invalidated
            }
        }
    }
}

/// Summarize each series with at least two occurrences for the classifier
fn build_summaries(records: &[crate::models::TransactionRecord]) -> Vec<SeriesSummary> {
    let mut groups: BTreeMap<SeriesKey, Vec<&crate::models::TransactionRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.series_key()).or_default().push(record);
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.len() >= 2)
        .map(|(key, mut group)| {
            group.sort_by_key(|r| r.occurred_at);
            let latest = group[group.len() - 1];
            let mut recent: Vec<_> = group.iter().map(|r| r.occurred_at).collect();
            if recent.len() > SUMMARY_OCCURRENCE_CAP {
                recent = recent.split_off(recent.len() - SUMMARY_OCCURRENCE_CAP);
            }
            SeriesSummary {
                title: latest.title.clone(),
                kind: key.kind,
                occurrence_count: group.len(),
                last_amount: latest.amount,
                recent_occurrences: recent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use chrono::Duration;

    use crate::ai::{ClassifierEntry, MockClassifier};
    use crate::models::{Frequency, TransactionKind};

    /// In-memory ledger that counts reads
    struct MemoryLedger {
        transactions: HashMap<String, Vec<RawTransaction>>,
        reads: Mutex<usize>,
    }

    impl MemoryLedger {
        fn new(user_id: &str, transactions: Vec<RawTransaction>) -> Self {
            let mut map = HashMap::new();
            map.insert(user_id.to_string(), transactions);
            Self {
                transactions: map,
                reads: Mutex::new(0),
            }
        }

        fn read_count(&self) -> usize {
            *self.reads.lock().unwrap()
        }
    }

    impl LedgerReader for MemoryLedger {
        fn list_transactions(&self, user_id: &str) -> Result<Vec<RawTransaction>> {
            *self.reads.lock().unwrap() += 1;
            Ok(self
                .transactions
                .get(user_id)
                .cloned()
                .unwrap_or_default())
        }
    }

    fn expense(title: &str, amount: f64, created_at: &str) -> RawTransaction {
        RawTransaction {
            id: format!("{}-{}", title, created_at),
            title: title.to_string(),
            amount,
            kind: TransactionKind::Expense,
            category: None,
            transaction_date: None,
            created_at: Some(created_at.to_string()),
        }
    }

    /// Three Netflix charges 30 days apart, creation timestamps only
    fn netflix_cold_start() -> Vec<RawTransaction> {
        vec![
            expense("Netflix", 149.0, "2024-01-01T10:00:00Z"),
            expense("Netflix", 149.0, "2024-01-31T10:00:00Z"),
            expense("Netflix", 149.0, "2024-03-01T10:00:00Z"),
        ]
    }

    #[tokio::test]
    async fn test_cold_start_scenario() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", netflix_cold_start()));
        let patterns = engine.get_patterns("u1", false).await.unwrap();

        assert_eq!(patterns.len(), 1);
        let p = &patterns[0];
        assert_eq!(p.title, "Netflix");
        assert_eq!(p.frequency, Frequency::Monthly);
        assert_eq!(p.confidence, 0.6);
        assert_eq!(p.amount, 149.0);
        let last = p.last_occurrence().unwrap();
        assert_eq!(p.next_expected, Some(last + Duration::days(30)));
    }

    #[tokio::test]
    async fn test_cache_served_until_invalidated() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", netflix_cold_start()));

        engine.get_patterns("u1", false).await.unwrap();
        engine.get_patterns("u1", false).await.unwrap();
        assert_eq!(engine.ledger.read_count(), 1, "second call hits the cache");

        engine.get_patterns("u1", true).await.unwrap();
        assert_eq!(engine.ledger.read_count(), 2, "force_refresh recomputes");
    }

    #[tokio::test]
    async fn test_notify_updated_keeps_cache_fresh() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", netflix_cold_start()));
        engine.get_patterns("u1", false).await.unwrap();

        // Right on cadence: 30 days after the last charge
        let outcome =
            engine.notify_new_transaction("u1", &expense("Netflix", 149.0, "2024-03-31T10:00:00Z"));
        assert_eq!(outcome, UpdateOutcome::Updated);

        let patterns = engine.get_patterns("u1", false).await.unwrap();
        assert_eq!(engine.ledger.read_count(), 1, "update did not force a rescan");
        assert_eq!(patterns[0].occurrences.len(), 4);
    }

    #[tokio::test]
    async fn test_notify_deviation_invalidates_cache() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", netflix_cold_start()));
        engine.get_patterns("u1", false).await.unwrap();

        // 80 days later, far outside the 30% band
        let outcome =
            engine.notify_new_transaction("u1", &expense("Netflix", 149.0, "2024-05-20T10:00:00Z"));
        assert_eq!(outcome, UpdateOutcome::Invalidated);

        engine.get_patterns("u1", false).await.unwrap();
        assert_eq!(engine.ledger.read_count(), 2, "stale cache forced a rescan");
    }

    #[tokio::test]
    async fn test_notify_without_cache_flags_rescan() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", netflix_cold_start()));
        let outcome =
            engine.notify_new_transaction("u1", &expense("Netflix", 149.0, "2024-03-31T10:00:00Z"));
        assert_eq!(outcome, UpdateOutcome::Invalidated);
    }

    #[tokio::test]
    async fn test_classifier_failure_degrades_to_fallback() {
        let engine = PatternEngine::with_classifier(
            MemoryLedger::new("u1", netflix_cold_start()),
            ClassifierClient::Mock(MockClassifier::failing()),
        );

        let patterns = engine.get_patterns("u1", false).await.unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].confidence, 0.6, "fallback confidence applies");
    }

    #[tokio::test]
    async fn test_classifier_entries_flow_through() {
        let entry = ClassifierEntry {
            title: "Netflix".to_string(),
            amount: Some(149.0),
            kind: TransactionKind::Expense,
            category: Some("entertainment".to_string()),
            frequency: "monthly".to_string(),
            confidence: 0.93,
            last_occurrence: Some("2024-03-01".to_string()),
            next_expected: Some("2024-03-31".to_string()),
        };
        let engine = PatternEngine::with_classifier(
            MemoryLedger::new("u1", netflix_cold_start()),
            ClassifierClient::Mock(MockClassifier::with_entries(vec![entry])),
        );

        let patterns = engine.get_patterns("u1", false).await.unwrap();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].confidence, 0.93);
        assert_eq!(
            patterns[0].next_expected.unwrap().format("%Y-%m-%d").to_string(),
            "2024-03-31"
        );
    }

    #[tokio::test]
    async fn test_classifier_unavailable_when_unconfigured() {
        let engine = PatternEngine::new(MemoryLedger::new("u1", Vec::new()));
        assert!(!engine.classifier_available().await);
    }

    #[test]
    fn test_summaries_skip_single_occurrence_series() {
        let records = normalize_all(&[
            expense("Netflix", 149.0, "2024-01-01T10:00:00Z"),
            expense("Netflix", 149.0, "2024-01-31T10:00:00Z"),
            expense("One-off", 20.0, "2024-02-01T10:00:00Z"),
        ]);
        let summaries = build_summaries(&records);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "Netflix");
        assert_eq!(summaries[0].occurrence_count, 2);
    }
}
