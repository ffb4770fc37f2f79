//! JSON parsing helpers for classifier responses
//!
//! LLM backends wrap their JSON in prose more often than not. These helpers
//! extract the JSON array from the surrounding text and parse entries one by
//! one, so a single malformed element drops that element rather than the
//! whole batch.

use tracing::debug;

use crate::error::{Error, Result};

use super::types::ClassifierEntry;

/// Extract and parse the classifier entries from a free-text response.
///
/// Finds the outermost JSON array in the response, parses each element
/// independently, and skips elements that do not deserialize. Fails only
/// when no JSON array is present at all.
pub fn parse_pattern_entries(response: &str) -> Result<Vec<ClassifierEntry>> {
    let response = response.trim();

    let start = response.find('[');
    let end = response.rfind(']');

    let json_str = match (start, end) {
        (Some(s), Some(e)) if s < e => &response[s..=e],
        _ => {
            return Err(Error::InvalidData(format!(
                "No JSON array found in classifier response | Raw: {}",
                truncate(response, 200)
            )));
        }
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(json_str).map_err(|e| {
        Error::InvalidData(format!(
            "Invalid JSON from classifier: {} | Raw: {}",
            e,
            truncate(json_str, 200)
        ))
    })?;

    let mut entries = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<ClassifierEntry>(value.clone()) {
            Ok(entry) => entries.push(entry),
            Err(e) => debug!("Skipping malformed classifier entry: {} | {}", e, value),
        }
    }

    Ok(entries)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    // Back off to a char boundary so multibyte text cannot split mid-char
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
