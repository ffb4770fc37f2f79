//! Engine configuration
//!
//! Every heuristic constant lives here as a named, tunable field rather than
//! a literal buried in detection code.

/// Pattern engine configuration
#[derive(Debug, Clone)]
pub struct PatternConfig {
    /// Minimum occurrences before a series can be classified
    pub min_occurrences: usize,
    /// Candidates below this confidence are never exposed to callers
    pub confidence_floor: f64,
    /// Confidence assigned on the deterministic fallback path
    pub fallback_confidence: f64,
    /// Incremental updates accept a new gap within this ratio of the
    /// series average (0.30 = plus or minus 30%)
    pub gap_tolerance_ratio: f64,
    /// Result list ceiling; truncation drops lowest-confidence candidates
    pub max_results: usize,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_occurrences: 3,
            confidence_floor: 0.4,
            fallback_confidence: 0.6,
            gap_tolerance_ratio: 0.30,
            max_results: 10,
        }
    }
}
