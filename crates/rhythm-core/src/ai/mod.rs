//! External classifier abstraction
//!
//! The pattern engine can consult an external AI classifier for frequency
//! labels, but never depends on it: every backend is optional, every
//! response is re-validated, and any failure degrades to the deterministic
//! threshold fallback.
//!
//! # Architecture
//!
//! - `ClassifierBackend` trait: the interface every backend implements
//! - `ClassifierClient` enum: concrete wrapper providing Clone + compile-time
//!   dispatch
//! - Backend implementations: `OllamaClassifier`, `MockClassifier`
//!
//! # Configuration
//!
//! Environment variables:
//! - `RHYTHM_CLASSIFIER_HOST`: Ollama-style server URL (unset disables the
//!   classifier entirely; the engine runs on the fallback path)
//! - `RHYTHM_CLASSIFIER_MODEL`: model name (default: llama3.2)

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockClassifier;
pub use ollama::OllamaClassifier;
pub use types::{ClassifierEntry, SeriesSummary};

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for pattern classifier backends
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    /// Classify series summaries into zero or more pattern entries.
    ///
    /// Returned entries are raw classifier output; callers must validate
    /// them before trusting any field.
    async fn classify_series(&self, series: &[SeriesSummary]) -> Result<Vec<ClassifierEntry>>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Model name (for logging)
    fn model(&self) -> &str;

    /// Host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete classifier client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ClassifierClient {
    /// Ollama-style HTTP backend
    Ollama(OllamaClassifier),
    /// Mock backend for testing
    Mock(MockClassifier),
}

impl ClassifierClient {
    /// Create a classifier client from environment variables.
    ///
    /// Returns `None` when `RHYTHM_CLASSIFIER_HOST` is unset — the engine
    /// then runs purely on the deterministic fallback.
    pub fn from_env() -> Option<Self> {
        OllamaClassifier::from_env().map(ClassifierClient::Ollama)
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        ClassifierClient::Ollama(OllamaClassifier::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ClassifierClient::Mock(MockClassifier::new())
    }
}

#[async_trait]
impl ClassifierBackend for ClassifierClient {
    async fn classify_series(&self, series: &[SeriesSummary]) -> Result<Vec<ClassifierEntry>> {
        match self {
            ClassifierClient::Ollama(b) => b.classify_series(series).await,
            ClassifierClient::Mock(b) => b.classify_series(series).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ClassifierClient::Ollama(b) => b.health_check().await,
            ClassifierClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ClassifierClient::Ollama(b) => b.model(),
            ClassifierClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ClassifierClient::Ollama(b) => b.host(),
            ClassifierClient::Mock(b) => b.host(),
        }
    }
}
