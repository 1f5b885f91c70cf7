//! Execution of individual data-mapping actions.
//!
//! Each action produces a *source* JSON value (a subgraph's `data`, a contract
//! return value, a fetched document). [`result::create_result_object`] then
//! picks the `seek` paths out of that source and names them with the matching
//! `populate` keys.
//!
//! Network and chain access sit behind two traits so callers and tests can
//! supply their own: [`JsonFetcher`] for HTTP and [`ContractReader`] for
//! contract reads.

pub mod contract;
pub mod fetch;
pub mod result;
pub mod subgraph;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use verdict_api::{SdkConfig, VerdictClient};
use verdict_types::{AbiCallMapping, AbiEventMapping, DataMapping};

use crate::error::ActionError;

pub use contract::{StaticContractReader, UnconfiguredContractReader};
pub use result::create_result_object;

/// HTTP access used by the `graphql`, `fetch/json`, and `fetch/ipfs/json` actions.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// POST `body` as JSON and return the parsed response.
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;

    /// GET `url` and return the parsed response.
    async fn get_json(&self, url: &str) -> Result<Value>;
}

/// Contract reads used by the `abi/call` and `abi/event` actions.
///
/// Implementations own ABI encoding, RPC transport, and decoding. The
/// mappings they receive have already had their placeholders substituted.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Call a view function and return its decoded result.
    async fn call(&self, mapping: &AbiCallMapping) -> Result<Value>;

    /// Return the decoded arguments of each matching event log, oldest first.
    async fn read_events(&self, mapping: &AbiEventMapping) -> Result<Vec<Value>>;
}

/// [`JsonFetcher`] backed by a configured [`VerdictClient`].
pub struct HttpJsonFetcher {
    client: VerdictClient,
}

impl HttpJsonFetcher {
    pub fn new(client: VerdictClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        verdict_util::post_json(&self.client, url, body).await
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        verdict_util::get_json(&self.client, url).await
    }
}

/// Collaborators and settings shared by every action in a run.
#[derive(Clone)]
pub struct ActionRuntime {
    fetcher: Arc<dyn JsonFetcher>,
    contracts: Arc<dyn ContractReader>,
    ipfs_gateway: String,
}

impl ActionRuntime {
    pub fn new(fetcher: Arc<dyn JsonFetcher>, contracts: Arc<dyn ContractReader>, ipfs_gateway: impl Into<String>) -> Self {
        Self {
            fetcher,
            contracts,
            ipfs_gateway: ipfs_gateway.into(),
        }
    }

    /// HTTP-backed runtime without a contract reader.
    pub fn from_config(config: &SdkConfig) -> Result<Self> {
        let client = VerdictClient::new(config)?;
        Ok(Self::new(
            Arc::new(HttpJsonFetcher::new(client)),
            Arc::new(UnconfiguredContractReader),
            config.ipfs_gateway.clone(),
        ))
    }

    pub fn with_contract_reader(mut self, contracts: Arc<dyn ContractReader>) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn fetcher(&self) -> &dyn JsonFetcher {
        self.fetcher.as_ref()
    }

    pub fn contracts(&self) -> &dyn ContractReader {
        self.contracts.as_ref()
    }

    pub fn ipfs_gateway(&self) -> &str {
        &self.ipfs_gateway
    }
}

/// Run one mapping whose placeholders are already substituted and return its
/// source value.
pub async fn execute_action(mapping: &DataMapping, runtime: &ActionRuntime) -> Result<Value, ActionError> {
    debug!(kind = %mapping.kind(), "executing data mapping");
    match mapping {
        DataMapping::Subgraph(subgraph) => subgraph::execute(subgraph, runtime.fetcher()).await,
        DataMapping::AbiCall(call) => contract::execute_call(call, runtime.contracts()).await,
        DataMapping::AbiEvent(event) => contract::execute_event(event, runtime.contracts()).await,
        DataMapping::Json(json) => Ok(json.value.clone()),
        DataMapping::FetchJson(fetch) => fetch::execute_json(&fetch.url, runtime.fetcher()).await,
        DataMapping::FetchIpfsJson(fetch) => fetch::execute_ipfs_json(&fetch.ipfs_uri, runtime).await,
    }
}
