//! Template records as stored by the dispute template registry subgraph.

use serde::{Deserialize, Serialize};

/// Registered dispute template. `template_data` and `template_data_mappings`
/// are JSON documents encoded as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeTemplateRecord {
    pub id: String,
    #[serde(default)]
    pub template_tag: Option<String>,
    pub template_data: String,
    #[serde(default)]
    pub template_data_mappings: Option<String>,
}

/// Dispute as indexed by the arbitrator's core subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedDispute {
    pub id: String,
    pub arbitrated: ArbitrableRef,
    pub arbitrable_chain_id: Option<String>,
    pub external_dispute_id: String,
    pub template_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrableRef {
    pub id: String,
}

impl DisputeTemplateRecord {
    /// Mapping document, treating a blank string as absent.
    pub fn mappings(&self) -> Option<&str> {
        self.template_data_mappings
            .as_deref()
            .map(str::trim)
            .filter(|mappings| !mappings.is_empty())
    }
}
