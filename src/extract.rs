use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// First fenced code block, optional language tag, lazy interior match.
static FENCED_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z0-9_-]+)?\s*(.*?)\s*```").expect("fenced block regex")
});

/// Recovers a JSON value embedded in free-form model output.
///
/// Tries the interior of the first fenced code block, then the whole text.
/// Returns `None` when neither parses; the caller treats that as an empty
/// result, not an error. Only the first fence is considered: a malformed
/// block falls through to the whole-text attempt, never to a second fence.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(caps) = FENCED_BLOCK.captures(text) {
        let interior = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        match serde_json::from_str(interior) {
            Ok(value) => return Some(value),
            Err(e) => debug!("fenced block is not valid JSON: {}", e),
        }
    }

    match serde_json::from_str(text.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("response text is not valid JSON either: {}", e);
            None
        }
    }
}
