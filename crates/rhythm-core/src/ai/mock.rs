//! Mock classifier backend for testing
//!
//! Returns a canned entry list instead of calling an LLM. Used throughout
//! the engine tests to exercise the external-classification path, including
//! its rejection and degradation branches.

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::types::{ClassifierEntry, SeriesSummary};
use super::ClassifierBackend;

/// Mock pattern classifier
#[derive(Clone, Default)]
pub struct MockClassifier {
    /// Entries returned from every `classify_series` call
    pub entries: Vec<ClassifierEntry>,
    /// Whether health_check should return true
    pub healthy: bool,
    /// When set, classify_series fails instead of returning entries
    pub failing: bool,
}

impl MockClassifier {
    /// Create a healthy mock that returns no entries
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            healthy: true,
            failing: false,
        }
    }

    /// Create a mock that returns the given entries
    pub fn with_entries(entries: Vec<ClassifierEntry>) -> Self {
        Self {
            entries,
            healthy: true,
            failing: false,
        }
    }

    /// Create a mock whose classify calls always fail
    pub fn failing() -> Self {
        Self {
            entries: Vec::new(),
            healthy: false,
            failing: true,
        }
    }
}

#[async_trait]
impl ClassifierBackend for MockClassifier {
    async fn classify_series(&self, _series: &[SeriesSummary]) -> Result<Vec<ClassifierEntry>> {
        if self.failing {
            return Err(Error::InvalidData("mock classifier failure".to_string()));
        }
        Ok(self.entries.clone())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
