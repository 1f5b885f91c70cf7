//! Path selection over JSON documents.
//!
//! Mapping `seek` paths and template placeholders share one path grammar:
//! dot-separated segments, where a segment may carry bracketed indices
//! (`answers[0].title`) or be a bare index (`answers.0.title`).

use serde_json::Value;

/// Select a nested JSON value by path.
///
/// Returns `None` when any segment is missing or applied to the wrong JSON
/// type. A blank path selects the whole value.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use verdict_util::path_processing::select_path;
///
/// let value = json!({ "dispute": { "rounds": [{ "jurors": 3 }, { "jurors": 7 }] } });
/// assert_eq!(select_path(&value, "dispute.rounds[1].jurors"), Some(&json!(7)));
/// assert_eq!(select_path(&value, "dispute.rounds.0.jurors"), Some(&json!(3)));
/// assert_eq!(select_path(&value, "dispute.period"), None);
/// ```
pub fn select_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for segment in trimmed.split('.') {
        if segment.is_empty() {
            continue;
        }
        let (key, indices) = split_indices(segment)?;
        if !key.is_empty() {
            current = step_into(current, key)?;
        }
        for index in indices {
            current = current.get(index)?;
        }
    }
    Some(current)
}

fn step_into<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Splits `name[0][1]` into `("name", [0, 1])`. Malformed brackets yield `None`.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(bracket) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };
    let key = &segment[..bracket];
    let mut indices = Vec::new();
    let mut rest = &segment[bracket..];
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indices.push(inner[..close].trim().parse::<usize>().ok()?);
        rest = &inner[close + 1..];
    }
    Some((key, indices))
}

/// Formats a JSON value as text for embedding in a larger string.
///
/// Strings are returned without quotes, `null` becomes empty, and containers
/// are rendered as compact JSON.
pub fn format_json_value(value: &Value) -> String {
    match value {
        Value::String(string_value) => string_value.clone(),
        Value::Number(number_value) => number_value.to_string(),
        Value::Bool(boolean_value) => boolean_value.to_string(),
        Value::Null => String::new(),
        other_value => other_value.to_string(),
    }
}
