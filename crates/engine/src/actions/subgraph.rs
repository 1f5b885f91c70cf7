use serde_json::{Value, json};
use tracing::warn;
use verdict_types::SubgraphMapping;
use verdict_util::redact_sensitive;

use super::JsonFetcher;
use crate::error::ActionError;

/// POST the query and return the response's `data` member.
pub async fn execute(mapping: &SubgraphMapping, fetcher: &dyn JsonFetcher) -> Result<Value, ActionError> {
    let body = json!({ "query": mapping.query, "variables": mapping.variables });
    let response = fetcher
        .post_json(&mapping.endpoint, &body)
        .await
        .map_err(|source| ActionError::Request {
            endpoint: redact_sensitive(&mapping.endpoint),
            source,
        })?;
    extract_data(response, &mapping.endpoint)
}

/// Split a GraphQL response into its `data`, failing on reported errors.
pub fn extract_data(response: Value, endpoint: &str) -> Result<Value, ActionError> {
    let messages = graphql_error_messages(&response);
    if !messages.is_empty() {
        let endpoint = redact_sensitive(endpoint);
        warn!(endpoint = %endpoint, error_count = messages.len(), "subgraph returned errors");
        return Err(ActionError::Graphql { endpoint, messages });
    }

    match response {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(ActionError::MissingData {
                endpoint: redact_sensitive(endpoint),
            }),
        },
        _ => Err(ActionError::MissingData {
            endpoint: redact_sensitive(endpoint),
        }),
    }
}

fn graphql_error_messages(response: &Value) -> Vec<String> {
    let Some(errors) = response.get("errors").and_then(Value::as_array) else {
        return Vec::new();
    };
    errors
        .iter()
        .map(|error| match error.get("message").and_then(Value::as_str) {
            Some(message) => message.to_string(),
            None => error.to_string(),
        })
        .collect()
}
