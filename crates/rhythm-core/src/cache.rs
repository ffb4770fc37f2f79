//! Per-user pattern cache
//!
//! Staleness is purely invalidation-driven: there is no time-based expiry.
//! A cache entry stays servable until an incremental update flags it or the
//! caller forces a refresh. Recomputation failures must never clobber a
//! previously good entry, so stores only happen with a complete new result.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::detect::ScanResult;
use crate::error::{Error, Result};
use crate::models::PatternCandidate;

/// One user's cached scan output
#[derive(Debug, Clone)]
pub struct CachedPatterns {
    /// Full internal candidate set, including Unclassified series
    pub candidates: Vec<PatternCandidate>,
    pub computed_at: DateTime<Utc>,
    /// Set when an incremental update has contradicted the cached state
    pub stale: bool,
}

/// In-memory pattern cache keyed by user id.
///
/// A single mutex serializes all cache access; recomputation is idempotent
/// and cheap, so last-write-wins after invalidation is sufficient and no
/// finer-grained locking is needed.
#[derive(Default)]
pub struct PatternCache {
    inner: Mutex<HashMap<String, CachedPatterns>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached candidate set for a user, only if present and not stale
    pub fn fresh(&self, user_id: &str) -> Result<Option<CachedPatterns>> {
        let inner = self.lock()?;
        Ok(inner.get(user_id).filter(|e| !e.stale).cloned())
    }

    /// Replace a user's entry with a freshly computed scan
    pub fn store(&self, user_id: &str, result: &ScanResult) -> Result<()> {
        let mut inner = self.lock()?;
        debug!(user_id, series = result.candidates.len(), "Storing scan result");
        inner.insert(
            user_id.to_string(),
            CachedPatterns {
                candidates: result.candidates.clone(),
                computed_at: result.computed_at,
                stale: false,
            },
        );
        Ok(())
    }

    /// Mark a user's entry stale; the next non-forced read recomputes
    pub fn invalidate(&self, user_id: &str) -> Result<()> {
        let mut inner = self.lock()?;
        if let Some(entry) = inner.get_mut(user_id) {
            entry.stale = true;
        }
        Ok(())
    }

    /// Run a closure against a user's entry while holding the lock.
    ///
    /// Returns `None` when the user has no cache entry at all.
    pub fn with_entry<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut CachedPatterns) -> T,
    ) -> Result<Option<T>> {
        let mut inner = self.lock()?;
        Ok(inner.get_mut(user_id).map(f))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, CachedPatterns>>> {
        self.inner
            .lock()
            .map_err(|_| Error::InvalidData("Failed to acquire pattern cache lock".into()))
    }
}
