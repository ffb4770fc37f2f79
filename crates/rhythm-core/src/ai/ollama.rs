//! Ollama classifier backend
//!
//! HTTP client for an Ollama-style `/api/generate` endpoint. The model is
//! asked for a JSON array of pattern entries; whatever comes back goes
//! through `parsing::parse_pattern_entries` and then per-field validation
//! before the engine trusts any of it.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

use super::parsing::parse_pattern_entries;
use super::types::{ClassifierEntry, SeriesSummary};
use super::ClassifierBackend;

/// Ollama-backed pattern classifier
#[derive(Clone)]
pub struct OllamaClassifier {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaClassifier {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables.
    ///
    /// Requires `RHYTHM_CLASSIFIER_HOST`; `RHYTHM_CLASSIFIER_MODEL`
    /// defaults to `llama3.2`.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("RHYTHM_CLASSIFIER_HOST").ok()?;
        let model =
            std::env::var("RHYTHM_CLASSIFIER_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    fn build_prompt(series: &[SeriesSummary]) -> String {
        let mut prompt = String::from(
            "You are analyzing personal finance transactions for recurring patterns.\n\
             For each series below, decide whether it recurs on a discoverable cadence.\n\
             Respond with ONLY a JSON array. Each element:\n\
             {\"title\": string, \"kind\": \"income\"|\"expense\", \"amount\": number, \
             \"category\": string, \"frequency\": \"daily\"|\"weekly\"|\"biweekly\"|\"monthly\"|\"quarterly\"|\"yearly\", \
             \"confidence\": number 0-1, \"lastOccurrence\": \"YYYY-MM-DD\", \"nextExpected\": \"YYYY-MM-DD\"}\n\
             Omit series that do not recur. Do not invent frequencies for irregular series.\n\nSeries:\n",
        );
        for s in series {
            let dates: Vec<String> = s
                .recent_occurrences
                .iter()
                .map(|d| d.format("%Y-%m-%d").to_string())
                .collect();
            prompt.push_str(&format!(
                "- {} ({}), {} occurrences, last amount {:.2}, dates: {}\n",
                s.title,
                s.kind.as_str(),
                s.occurrence_count,
                s.last_amount,
                dates.join(", ")
            ));
        }
        prompt
    }
}

/// Request to the Ollama API
#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from the Ollama API
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl ClassifierBackend for OllamaClassifier {
    async fn classify_series(&self, series: &[SeriesSummary]) -> Result<Vec<ClassifierEntry>> {
        if series.is_empty() {
            return Ok(Vec::new());
        }

        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: Self::build_prompt(series),
            stream: false,
        };

        debug!(
            model = %self.model,
            series = series.len(),
            "Requesting pattern classification"
        );

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<GenerateResponse>()
            .await?;

        parse_pattern_entries(&response.response)
    }

    async fn health_check(&self) -> bool {
        self.http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
