use serde_json::Value;
use tracing::debug;
use verdict_util::{redact_sensitive, resolve_ipfs_uri};

use super::{ActionRuntime, JsonFetcher};
use crate::error::ActionError;

/// GET an off-chain JSON document.
pub async fn execute_json(url: &str, fetcher: &dyn JsonFetcher) -> Result<Value, ActionError> {
    fetcher.get_json(url).await.map_err(|source| ActionError::Request {
        endpoint: redact_sensitive(url),
        source,
    })
}

/// Resolve an IPFS reference on the runtime's gateway, then GET it.
pub async fn execute_ipfs_json(ipfs_uri: &str, runtime: &ActionRuntime) -> Result<Value, ActionError> {
    let url = resolve_ipfs_uri(ipfs_uri, runtime.ipfs_gateway())?;
    debug!(ipfs_uri, url = %url, "resolved IPFS reference");
    execute_json(&url, runtime.fetcher()).await
}
