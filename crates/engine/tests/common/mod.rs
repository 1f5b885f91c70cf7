#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Value, json};
use verdict_engine::{ActionRuntime, JsonFetcher, StaticContractReader};

pub const GATEWAY: &str = "https://ipfs.example.org";
pub const ESCROW_SUBGRAPH: &str = "https://escrow.example.org/subgraphs/escrow";
pub const DELIVERABLE_URL: &str = "https://ipfs.example.org/ipfs/QmDeliverable/terms.json";
pub const ARBITRATOR: &str = "0x1111111111111111111111111111111111111111";

pub const ESCROW_TEMPLATE: &str = include_str!("../data/escrow_template.json");
pub const ESCROW_MAPPINGS: &str = include_str!("../data/escrow_mappings.json");

pub fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture must be valid JSON")
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
}

/// Answers requests from canned responses keyed by URL.
#[derive(Default)]
pub struct StubFetcher {
    responses: HashMap<String, Value>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl StubFetcher {
    pub fn with_response(mut self, url: &str, response: Value) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn answer(&self, method: &'static str, url: &str, body: Option<&Value>) -> Result<Value> {
        self.requests.lock().expect("requests lock").push(RecordedRequest {
            method,
            url: url.to_string(),
            body: body.cloned(),
        });
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("GET {url} failed: 404 Not Found"))
    }
}

#[async_trait]
impl JsonFetcher for StubFetcher {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        self.answer("POST", url, Some(body))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        self.answer("GET", url, None)
    }
}

pub fn escrow_fetcher() -> StubFetcher {
    StubFetcher::default()
        .with_response(ESCROW_SUBGRAPH, fixture(include_str!("../data/escrow_subgraph_response.json")))
        .with_response(DELIVERABLE_URL, fixture(include_str!("../data/deliverable.json")))
}

pub fn escrow_contracts() -> StaticContractReader {
    StaticContractReader::default().with_call(ARBITRATOR, "appealCost", json!("2500000000000000"))
}

pub fn runtime(fetcher: Arc<StubFetcher>) -> ActionRuntime {
    ActionRuntime::new(fetcher, Arc::new(escrow_contracts()), GATEWAY)
}
