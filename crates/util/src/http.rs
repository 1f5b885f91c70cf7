//! # HTTP Utilities
//!
//! Response parsing helpers shared by the API client and the action executors.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Characters of response body kept in parse error messages.
pub const BODY_PREVIEW_LIMIT: usize = 200;

/// Return a user-friendly error message for common HTTP status codes.
///
/// # Example
/// ```rust
/// use verdict_util::http::status_error_message;
///
/// let error_401 = status_error_message(401).unwrap();
/// assert!(error_401.contains("VERDICT_API_KEY"));
///
/// let error_429 = status_error_message(429).unwrap();
/// assert!(error_429.contains("rate limited"));
///
/// assert!(status_error_message(404).is_none());
/// ```
pub fn status_error_message(status_code: u16) -> Option<String> {
    match status_code {
        401 => Some("Unauthorized (401). Hint: set VERDICT_API_KEY=... or configure apiKey in the config file".into()),
        403 => Some("Forbidden (403). Hint: the gateway key may not be allowed to query this subgraph".into()),
        429 => Some("Too Many Requests (429). Hint: the endpoint rate limited this client; retry later".into()),
        _ => None,
    }
}

/// Decode a response body as JSON.
///
/// Subgraphs and IPFS gateways answer outages with HTML error pages, often
/// with a 200 status. The error keeps the status and a short description of
/// what came back instead, so the failing mapping can be diagnosed from logs.
///
/// # Example
/// ```rust
/// use verdict_util::http::parse_json_body;
///
/// let ok = parse_json_body(r#"{"data": {"dispute": null}}"#, None).unwrap();
/// assert!(ok["data"]["dispute"].is_null());
///
/// let error = parse_json_body("<html><title>504 Gateway Time-out</title></html>", None).unwrap_err();
/// assert_eq!(error.summary(), "HTML page titled '504 Gateway Time-out'");
/// ```
pub fn parse_json_body(text: &str, status: Option<StatusCode>) -> Result<Value, ResponseJsonError> {
    serde_json::from_str(text).map_err(|source| ResponseJsonError {
        status,
        summary: summarize_body(text),
        source,
    })
}

/// One-line description of a non-JSON body.
///
/// HTML pages are reduced to their `<title>`; anything else has whitespace
/// runs collapsed and is cut to [`BODY_PREVIEW_LIMIT`] characters.
pub fn summarize_body(text: &str) -> String {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return "empty body".to_string();
    }
    let looks_like_html = trimmed
        .get(..5)
        .is_some_and(|start| start.eq_ignore_ascii_case("<html") || start.eq_ignore_ascii_case("<!doc"));
    if looks_like_html && let Some(title) = html_title(trimmed) {
        return format!("HTML page titled '{title}'");
    }

    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(BODY_PREVIEW_LIMIT) {
        Some((cut, _)) => format!("'{}...'", &collapsed[..cut]),
        None => format!("'{collapsed}'"),
    }
}

fn html_title(page: &str) -> Option<String> {
    let lowered = page.to_ascii_lowercase();
    let open = lowered.find("<title>")? + "<title>".len();
    let close = open + lowered[open..].find("</title>")?;
    let title = page[open..close].split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

/// A response body that should have been JSON and was not.
#[derive(Debug, Error)]
#[error("expected a JSON response ({}) but got {summary}: {source}", .status.map(|code| code.to_string()).unwrap_or_else(|| "status unknown".to_string()))]
pub struct ResponseJsonError {
    status: Option<StatusCode>,
    summary: String,
    #[source]
    source: serde_json::Error,
}

impl ResponseJsonError {
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// What the body looked like instead of JSON.
    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_error_pages_are_summarized_by_title() {
        let page = "<!DOCTYPE html>\n<html><head><title>\n  502 Bad Gateway\n</title></head><body>nginx</body></html>";
        let error = parse_json_body(page, Some(StatusCode::OK)).unwrap_err();
        assert_eq!(error.status(), Some(StatusCode::OK));
        assert_eq!(error.summary(), "HTML page titled '502 Bad Gateway'");
        assert!(error.to_string().starts_with("expected a JSON response (200 OK) but got HTML page"), "{error}");
    }

    #[test]
    fn plain_text_is_collapsed_and_cut() {
        let body = format!("indexing   error\n\tretry {}", "é".repeat(300));
        let summary = summarize_body(&body);
        assert!(summary.starts_with("'indexing error retry é"), "{summary}");
        assert!(summary.ends_with("...'"));
        assert_eq!(summary.chars().count(), BODY_PREVIEW_LIMIT + 5);
    }

    #[test]
    fn empty_and_untitled_bodies() {
        assert_eq!(summarize_body(" \n "), "empty body");
        assert_eq!(summarize_body("<html><body>down</body></html>"), "'<html><body>down</body></html>'");
        let error = parse_json_body("", None).unwrap_err();
        assert!(error.to_string().contains("(status unknown) but got empty body"), "{error}");
    }
}
