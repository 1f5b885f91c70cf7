//! Error types surfaced by template rendering, action execution, and the pipeline.

use thiserror::Error;
use verdict_types::{MappingKind, ValidationError};
use verdict_util::IpfsUriError;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// Every placeholder whose path had no value, in document order.
    #[error("unresolved placeholders: {}", .placeholders.join(", "))]
    Unresolved { placeholders: Vec<String> },
    /// `{{` without a matching close, or an empty `{{ }}`.
    #[error("malformed placeholders: {}", .fragments.join(", "))]
    Malformed { fragments: Vec<String> },
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("could not substitute mapping fields: {0}")]
    Render(#[from] TemplateError),
    #[error("mapping is invalid after substitution: {0}")]
    InvalidMapping(#[source] serde_json::Error),
    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("subgraph {endpoint} returned errors: {}", .messages.join("; "))]
    Graphql { endpoint: String, messages: Vec<String> },
    #[error("subgraph {endpoint} returned no data")]
    MissingData { endpoint: String },
    #[error("contract read on {address} failed: {source}")]
    Contract {
        address: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("no matching events emitted by {address}")]
    NoEvents { address: String },
    #[error(transparent)]
    Ipfs(#[from] IpfsUriError),
    #[error("seek path '{path}' not found in action response")]
    SeekNotFound { path: String },
    #[error("{seek} seek paths but {populate} populate keys")]
    SeekPopulateMismatch { seek: usize, populate: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The first failing mapping; later mappings were not executed.
    #[error("data mapping #{index} ({kind}) failed: {source}")]
    Action {
        index: usize,
        kind: MappingKind,
        #[source]
        source: ActionError,
    },
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("invalid data mappings: {0}")]
    InvalidMappings(#[source] serde_yaml::Error),
    #[error("invalid template: {0}")]
    InvalidTemplate(#[source] serde_json::Error),
    #[error("rendered template is not a valid dispute: {0}")]
    Validation(#[from] ValidationError),
    #[error("{0} subgraph endpoint is not configured")]
    MissingEndpoint(&'static str),
    #[error("query against {endpoint} failed: {source}")]
    Query {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("dispute {id} not found")]
    DisputeNotFound { id: String },
    #[error("dispute template {id} not found")]
    TemplateNotFound { id: String },
}
