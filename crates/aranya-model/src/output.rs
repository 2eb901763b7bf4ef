//! Extraction of the JSON object from a model reply.
//!
//! Providers asked for JSON still sometimes wrap it in a Markdown fence or
//! add a sentence around it.
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static FENCED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());

/// Pull the first JSON object out of `raw`.
pub fn extract_json(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("model returned an empty response".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return object_only(value);
    }

    if let Some(caps) = FENCED.captures(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(&caps[1]) {
            return object_only(value);
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<Value>(&trimmed[start..=end])
                .map_err(|e| format!("reply is not valid JSON: {}", e))
                .and_then(object_only)
        }
        _ => Err("reply does not contain a JSON object".to_string()),
    }
}

fn object_only(value: Value) -> Result<Value, String> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(format!("expected a JSON object, got {}", kind(&value)))
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
