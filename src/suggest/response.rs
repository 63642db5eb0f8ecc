use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::FormError;
use crate::page::page_model::SuggestionMap;

fn fenced_json() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)```json[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("fence pattern is valid")
    })
}

/// Contents of the first ```json fenced block, if any.
pub fn extract_fenced_json(text: &str) -> Option<&str> {
    fenced_json()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Parse generated text into a suggestion map.
///
/// A fenced ```json block wins; otherwise the whole text must be JSON. The
/// top level must be an object. Nulls are dropped so "absent" keeps meaning
/// "leave the current value".
pub fn parse_suggestions(text: &str) -> Result<SuggestionMap, FormError> {
    let candidate = extract_fenced_json(text).unwrap_or(text).trim();

    let parsed: Value = serde_json::from_str(candidate).map_err(|_| FormError::InvalidResponse {
        raw: text.to_string(),
    })?;

    let Value::Object(entries) = parsed else {
        return Err(FormError::InvalidResponse {
            raw: text.to_string(),
        });
    };

    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| value_to_text(value).map(|v| (key, v)))
        .collect())
}

fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
