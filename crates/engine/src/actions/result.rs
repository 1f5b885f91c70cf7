use indexmap::IndexMap;
use serde_json::Value;
use verdict_types::ResultSpec;
use verdict_util::select_path;

use crate::error::ActionError;

/// Pick each `seek` path out of `source` and key it by the matching
/// `populate` entry.
///
/// A blank seek path selects the whole source. A path that finds nothing
/// fails the action; an explicit JSON `null` is a value and is kept.
pub fn create_result_object(source: &Value, spec: &ResultSpec) -> Result<IndexMap<String, Value>, ActionError> {
    let pairs = spec.pairs().ok_or(ActionError::SeekPopulateMismatch {
        seek: spec.seek.len(),
        populate: spec.populate.len(),
    })?;

    let mut result = IndexMap::with_capacity(spec.populate.len());
    for (seek, populate) in pairs {
        let value = select_path(source, seek).ok_or_else(|| ActionError::SeekNotFound { path: seek.to_string() })?;
        result.insert(populate.to_string(), value.clone());
    }
    Ok(result)
}
