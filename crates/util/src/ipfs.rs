//! IPFS URI normalization.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IpfsUriError {
    #[error("IPFS URI is empty")]
    Empty,
    #[error("invalid IPFS gateway '{gateway}': {reason}")]
    InvalidGateway { gateway: String, reason: String },
    #[error("'{0}' is not an IPFS URI")]
    NotIpfs(String),
}

/// Resolve an IPFS reference to an HTTP URL on `gateway`.
///
/// Accepted forms: `ipfs://CID/path`, `/ipfs/CID/path`, `ipfs/CID/path`, or a
/// bare `CID/path`. Anything with an `http(s)` scheme is returned unchanged.
///
/// # Example
/// ```rust
/// use verdict_util::ipfs::resolve_ipfs_uri;
///
/// let url = resolve_ipfs_uri("ipfs://QmXyz/evidence.json", "https://cdn.example.org").unwrap();
/// assert_eq!(url, "https://cdn.example.org/ipfs/QmXyz/evidence.json");
/// ```
pub fn resolve_ipfs_uri(uri: &str, gateway: &str) -> Result<String, IpfsUriError> {
    let trimmed = uri.trim();
    if trimmed.is_empty() {
        return Err(IpfsUriError::Empty);
    }
    if trimmed.starts_with("https://") || trimmed.starts_with("http://") {
        return Ok(trimmed.to_string());
    }

    let content_path = trimmed
        .strip_prefix("ipfs://")
        .or_else(|| trimmed.strip_prefix("/ipfs/"))
        .or_else(|| trimmed.strip_prefix("ipfs/"))
        .unwrap_or(trimmed)
        .trim_start_matches('/');
    if content_path.is_empty() || content_path.contains("://") {
        return Err(IpfsUriError::NotIpfs(trimmed.to_string()));
    }

    let base = Url::parse(gateway).map_err(|error| IpfsUriError::InvalidGateway {
        gateway: gateway.to_string(),
        reason: error.to_string(),
    })?;
    let base = base.as_str().trim_end_matches('/');
    Ok(format!("{base}/ipfs/{content_path}"))
}
