//! JSON request execution shared by the pipeline actions and the dispute loader.

use std::time::Instant;

use anyhow::anyhow;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use verdict_api::VerdictClient;

use crate::{http, redact_sensitive};

/// Execute a JSON request and parse the response payload.
///
/// A JSON `body` is attached when present. Returns the parsed payload for a
/// successful response, `Value::Null` for an empty body, or an error for
/// transport failures, non-2xx statuses, and malformed JSON. URLs are
/// redacted before they reach the logs.
pub async fn execute_json_request(
    client: &VerdictClient,
    method: Method,
    url: &str,
    body: Option<&Value>,
) -> anyhow::Result<Value> {
    let start = Instant::now();
    let logged_url = redact_sensitive(url);
    debug!(method = %method, url = %logged_url, has_body = body.is_some(), "http request started");

    let mut request_builder = client.request(method.clone(), url)?;
    if let Some(body) = body {
        request_builder = request_builder.json(body);
    }

    let response = request_builder.send().await.map_err(|error| {
        warn!(
            method = %method,
            url = %logged_url,
            duration_ms = start.elapsed().as_millis(),
            "http request could not be sent"
        );
        anyhow!("network error for {}: {}", logged_url, redact_sensitive(&error.to_string()))
    })?;
    let status = response.status();
    if let Err(error) = response.error_for_status_ref() {
        warn!(
            method = %method,
            url = %logged_url,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request failed"
        );
        let message = http::status_error_message(status.as_u16())
            .unwrap_or_else(|| redact_sensitive(&error.to_string()));
        return Err(anyhow!("{} {} failed: {}", method, logged_url, message));
    }
    let body_text = response.text().await.map_err(|error| anyhow!(error))?;

    if body_text.trim().is_empty() {
        debug!(
            method = %method,
            url = %logged_url,
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "http request completed with empty response"
        );
        return Ok(Value::Null);
    }

    let parsed = http::parse_json_body(&body_text, Some(status)).map_err(|error| {
        warn!(
            method = %method,
            url = %logged_url,
            status = %status,
            body_len = body_text.len(),
            duration_ms = start.elapsed().as_millis(),
            error = %error,
            "http response JSON parse failed"
        );
        anyhow!(error)
    })?;
    debug!(
        method = %method,
        url = %logged_url,
        status = %status,
        duration_ms = start.elapsed().as_millis(),
        "http request completed"
    );
    Ok(parsed)
}

/// POST a JSON body to `url`.
pub async fn post_json(client: &VerdictClient, url: &str, body: &Value) -> anyhow::Result<Value> {
    execute_json_request(client, Method::POST, url, Some(body)).await
}

/// GET a JSON document from `url`.
pub async fn get_json(client: &VerdictClient, url: &str) -> anyhow::Result<Value> {
    execute_json_request(client, Method::GET, url, None).await
}
