//! # Text Processing Utilities
//!
//! Redaction of credentials that tend to leak into logs and error messages:
//! gateway API keys embedded in subgraph URLs, RPC provider keys, query-string
//! tokens, and authorization headers.

use once_cell::sync::Lazy;
use regex::Regex;

const REPLACEMENT: &str = "[REDACTED]";

/// Redacts values that look like secrets in a string.
///
/// Each pattern captures up to three groups: a prefix that is kept, the secret
/// value that is replaced, and an optional suffix that is kept.
///
/// # Example
/// ```rust
/// use verdict_util::text_processing::redact_sensitive;
///
/// let url = "https://gateway.example.com/api/0123456789abcdef0123456789abcdef/subgraphs/id/Qm";
/// assert_eq!(
///     redact_sensitive(url),
///     "https://gateway.example.com/api/[REDACTED]/subgraphs/id/Qm"
/// );
///
/// let line = "Authorization: Bearer secret123";
/// assert_eq!(redact_sensitive(line), "Authorization: [REDACTED]");
/// ```
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();

    for pattern in redact_patterns().iter() {
        redacted = pattern
            .replace_all(&redacted, |captures: &regex::Captures| {
                let prefix = captures.get(1).map(|m| m.as_str()).unwrap_or("");
                let suffix = captures.get(3).map(|m| m.as_str()).unwrap_or("");
                format!("{prefix}{REPLACEMENT}{suffix}")
            })
            .to_string();
    }

    redacted
}

fn redact_patterns() -> &'static Vec<Regex> {
    static REDACT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(build_redact_patterns);

    &REDACT_PATTERNS
}

fn build_redact_patterns() -> Vec<Regex> {
    [
        // Authorization headers, whole remainder of the line.
        r"(?i)(authorization:\s*)([^\r\n]+)()",
        // Query-string credentials.
        r"(?i)([?&](?:api[_-]?key|apikey|key|token|access_token)=)([^&#\s]+)()",
        // The Graph gateway: /api/<32 hex>/subgraphs/...
        r"(?i)(/api/)([0-9a-f]{32})(/)",
        // Hosted RPC providers: /v2/<key> or /v3/<key>
        r"(/v[23]/)([A-Za-z0-9_-]{16,})()",
        // Environment-style assignments.
        r"(\b[A-Z0-9_]*(?:API_KEY|TOKEN|SECRET|PASSWORD)=)(\S+)()",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("redaction pattern compiles"))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_rpc_provider_keys() {
        let input = "https://arb-sepolia.g.alchemy.com/v2/AbCdEfGh1234567890_xyz";
        assert_eq!(redact_sensitive(input), "https://arb-sepolia.g.alchemy.com/v2/[REDACTED]");
    }

    #[test]
    fn redacts_query_string_tokens() {
        let input = "https://ipfs.example.org/ipfs/Qm?api_key=abc123&format=json";
        assert_eq!(redact_sensitive(input), "https://ipfs.example.org/ipfs/Qm?api_key=[REDACTED]&format=json");
    }

    #[test]
    fn redacts_env_assignments() {
        let input = "VERDICT_API_KEY=supersecret";
        assert_eq!(redact_sensitive(input), "VERDICT_API_KEY=[REDACTED]");
    }

    #[test]
    fn leaves_plain_urls_untouched() {
        let input = "https://api.studio.example/query/61738/kleros-v2-core/version/latest";
        assert_eq!(redact_sensitive(input), input);
    }
}
