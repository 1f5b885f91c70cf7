//! Declarative data-mapping actions attached to a dispute template.
//!
//! A template ships with a JSON array of mappings. Each mapping names a data
//! source (subgraph, contract, JSON document) and a pair of `seek`/`populate`
//! lists: `seek[i]` is a path into the action's response and `populate[i]` is
//! the context key that receives the value found there.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One declarative fetch step, tagged by the JSON `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DataMapping {
    /// POST a GraphQL query to a subgraph endpoint.
    #[serde(rename = "graphql")]
    Subgraph(SubgraphMapping),
    /// Read a view function on a smart contract.
    #[serde(rename = "abi/call")]
    AbiCall(AbiCallMapping),
    /// Read decoded event logs emitted by a smart contract.
    #[serde(rename = "abi/event")]
    AbiEvent(AbiEventMapping),
    /// Literal JSON value embedded in the mapping itself.
    #[serde(rename = "json")]
    Json(JsonMapping),
    /// GET an off-chain JSON document.
    #[serde(rename = "fetch/json")]
    FetchJson(FetchJsonMapping),
    /// GET a JSON document stored on IPFS through the configured gateway.
    #[serde(rename = "fetch/ipfs/json")]
    FetchIpfsJson(FetchIpfsJsonMapping),
}

impl DataMapping {
    /// Returns the action kind discriminant.
    pub fn kind(&self) -> MappingKind {
        match self {
            Self::Subgraph(_) => MappingKind::Subgraph,
            Self::AbiCall(_) => MappingKind::AbiCall,
            Self::AbiEvent(_) => MappingKind::AbiEvent,
            Self::Json(_) => MappingKind::Json,
            Self::FetchJson(_) => MappingKind::FetchJson,
            Self::FetchIpfsJson(_) => MappingKind::FetchIpfsJson,
        }
    }

    /// Returns the seek/populate pairs shared by every action kind.
    pub fn result_spec(&self) -> &ResultSpec {
        match self {
            Self::Subgraph(mapping) => &mapping.result,
            Self::AbiCall(mapping) => &mapping.result,
            Self::AbiEvent(mapping) => &mapping.result,
            Self::Json(mapping) => &mapping.result,
            Self::FetchJson(mapping) => &mapping.result,
            Self::FetchIpfsJson(mapping) => &mapping.result,
        }
    }
}

/// Action kind without its payload. Displays as the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingKind {
    Subgraph,
    AbiCall,
    AbiEvent,
    Json,
    FetchJson,
    FetchIpfsJson,
}

impl MappingKind {
    /// Wire tag used in the `type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subgraph => "graphql",
            Self::AbiCall => "abi/call",
            Self::AbiEvent => "abi/event",
            Self::Json => "json",
            Self::FetchJson => "fetch/json",
            Self::FetchIpfsJson => "fetch/ipfs/json",
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to look in an action response and where to store what was found.
///
/// Both fields accept either a single string or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSpec {
    /// Paths into the action response (`a.b`, `a.0.b`, `a[0].b`).
    #[serde(default, deserialize_with = "one_or_many")]
    pub seek: Vec<String>,
    /// Context keys receiving the values found at the matching `seek` path.
    #[serde(default, deserialize_with = "one_or_many")]
    pub populate: Vec<String>,
}

impl ResultSpec {
    pub fn new<S: Into<String>>(seek: impl IntoIterator<Item = S>, populate: impl IntoIterator<Item = S>) -> Self {
        Self {
            seek: seek.into_iter().map(Into::into).collect(),
            populate: populate.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterates `(seek, populate)` pairs when both lists line up.
    pub fn pairs(&self) -> Option<impl Iterator<Item = (&str, &str)>> {
        if self.seek.len() != self.populate.len() {
            return None;
        }
        Some(self.seek.iter().map(String::as_str).zip(self.populate.iter().map(String::as_str)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubgraphMapping {
    /// GraphQL endpoint of the subgraph.
    pub endpoint: String,
    /// GraphQL document sent as `query`.
    pub query: String,
    /// Optional GraphQL variables.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub variables: Map<String, Value>,
    #[serde(flatten)]
    pub result: ResultSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiCallMapping {
    /// Human-readable function signature, e.g. `function appealCost(uint256) view returns (uint256)`.
    pub abi: String,
    /// Contract address.
    pub address: String,
    /// Function to call when `abi` declares more than one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
    /// Positional call arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
    /// Chain the contract lives on; the reader's default chain when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(flatten)]
    pub result: ResultSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiEventMapping {
    /// Human-readable event signature, e.g. `event DisputeRequest(address indexed _arbitrator, ...)`.
    pub abi: String,
    /// Emitting contract address.
    pub address: String,
    #[serde(default)]
    pub event_filter: EventFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(flatten)]
    pub result: ResultSpec,
}

/// Block range and indexed-argument filter for an event read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    /// First block to scan; a number or a tag such as `earliest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_block: Option<Value>,
    /// Last block to scan; a number or a tag such as `latest`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_block: Option<Value>,
    /// Indexed argument values to match, keyed by argument name.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonMapping {
    pub value: Value,
    #[serde(flatten)]
    pub result: ResultSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchJsonMapping {
    pub url: String,
    #[serde(flatten)]
    pub result: ResultSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchIpfsJsonMapping {
    /// `ipfs://CID/path`, `/ipfs/CID/path` or a bare CID.
    pub ipfs_uri: String,
    #[serde(flatten)]
    pub result: ResultSpec,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(single) => vec![single],
        OneOrMany::Many(list) => list,
    })
}
