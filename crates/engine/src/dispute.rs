//! Loading a dispute end to end: core subgraph, template registry, pipeline.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::info;
use verdict_api::SdkConfig;
use verdict_types::{DataContext, DisputeDetails, DisputeTemplateRecord, IndexedDispute};
use verdict_util::redact_sensitive;

use crate::actions::ActionRuntime;
use crate::actions::subgraph::extract_data;
use crate::error::PipelineError;
use crate::pipeline::render_dispute;

const DISPUTE_QUERY: &str = r#"query Dispute($disputeID: ID!) {
  dispute(id: $disputeID) {
    id
    arbitrated { id }
    arbitrableChainId
    externalDisputeId
    templateId
  }
}"#;

const TEMPLATE_QUERY: &str = r#"query DisputeTemplate($id: ID!) {
  disputeTemplate(id: $id) {
    id
    templateTag
    templateData
    templateDataMappings
  }
}"#;

pub struct DisputeLoader {
    runtime: ActionRuntime,
    core_subgraph: String,
    dtr_subgraph: String,
}

impl DisputeLoader {
    pub fn new(runtime: ActionRuntime, core_subgraph: impl Into<String>, dtr_subgraph: impl Into<String>) -> Self {
        Self {
            runtime,
            core_subgraph: core_subgraph.into(),
            dtr_subgraph: dtr_subgraph.into(),
        }
    }

    /// Use the subgraph endpoints from `config`; both must be set.
    pub fn from_config(config: &SdkConfig, runtime: ActionRuntime) -> Result<Self, PipelineError> {
        let core = config.core_subgraph.clone().ok_or(PipelineError::MissingEndpoint("core"))?;
        let dtr = config
            .dtr_subgraph
            .clone()
            .ok_or(PipelineError::MissingEndpoint("dispute template registry"))?;
        Ok(Self::new(runtime, core, dtr))
    }

    pub async fn fetch_dispute(&self, dispute_id: &str) -> Result<IndexedDispute, PipelineError> {
        let data = self
            .query(&self.core_subgraph, DISPUTE_QUERY, json!({ "disputeID": dispute_id }))
            .await?;
        decode(&self.core_subgraph, data, "dispute")?
            .ok_or_else(|| PipelineError::DisputeNotFound { id: dispute_id.to_string() })
    }

    pub async fn fetch_template(&self, template_id: &str) -> Result<DisputeTemplateRecord, PipelineError> {
        let data = self
            .query(&self.dtr_subgraph, TEMPLATE_QUERY, json!({ "id": template_id }))
            .await?;
        decode(&self.dtr_subgraph, data, "disputeTemplate")?
            .ok_or_else(|| PipelineError::TemplateNotFound { id: template_id.to_string() })
    }

    /// Resolve the dispute's template and render it with the template's mappings.
    pub async fn get_dispute(&self, dispute_id: &str) -> Result<DisputeDetails, PipelineError> {
        let dispute = self.fetch_dispute(dispute_id).await?;
        let template = self.fetch_template(&dispute.template_id).await?;
        info!(
            dispute_id,
            template_id = %template.id,
            template_tag = template.template_tag.as_deref().unwrap_or_default(),
            has_mappings = template.mappings().is_some(),
            "dispute template resolved"
        );
        render_dispute(&template.template_data, template.mappings(), initial_context(&dispute), &self.runtime).await
    }

    async fn query(&self, endpoint: &str, query: &str, variables: Value) -> Result<Value, PipelineError> {
        let query_error = |source: anyhow::Error| PipelineError::Query {
            endpoint: redact_sensitive(endpoint),
            source,
        };
        let body = json!({ "query": query, "variables": variables });
        let response = self
            .runtime
            .fetcher()
            .post_json(endpoint, &body)
            .await
            .map_err(query_error)?;
        extract_data(response, endpoint).map_err(|error| query_error(error.into()))
    }
}

/// `data.<field>`, with `null` or absence meaning "not found".
fn decode<T: DeserializeOwned>(endpoint: &str, mut data: Value, field: &str) -> Result<Option<T>, PipelineError> {
    match data.get_mut(field).map(Value::take) {
        None | Some(Value::Null) => Ok(None),
        Some(entity) => serde_json::from_value(entity).map(Some).map_err(|error| PipelineError::Query {
            endpoint: redact_sensitive(endpoint),
            source: anyhow::Error::new(error).context(format!("unexpected `{field}` shape")),
        }),
    }
}

/// Values every template may reference before any mapping runs.
pub fn initial_context(dispute: &IndexedDispute) -> DataContext {
    let mut context = DataContext::new();
    context.insert("disputeID", dispute.id.clone());
    context.insert("arbitrable", dispute.arbitrated.id.clone());
    context.insert("arbitrableAddress", dispute.arbitrated.id.clone());
    context.insert(
        "arbitrableChainID",
        dispute.arbitrable_chain_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    context.insert("externalDisputeID", dispute.external_dispute_id.clone());
    context.insert("templateID", dispute.template_id.clone());
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_types::ArbitrableRef;

    #[test]
    fn initial_context_names_every_dispute_field() {
        let dispute = IndexedDispute {
            id: "42".to_string(),
            arbitrated: ArbitrableRef {
                id: "0x3333333333333333333333333333333333333333".to_string(),
            },
            arbitrable_chain_id: Some("421614".to_string()),
            external_dispute_id: "7".to_string(),
            template_id: "3".to_string(),
        };

        let context = initial_context(&dispute);
        assert_eq!(
            context.keys().collect::<Vec<_>>(),
            vec!["disputeID", "arbitrable", "arbitrableAddress", "arbitrableChainID", "externalDisputeID", "templateID"]
        );
        assert_eq!(context.get("arbitrable"), Some(&json!("0x3333333333333333333333333333333333333333")));
        assert_eq!(context.get("templateID"), Some(&json!("3")));
    }

    #[test]
    fn from_config_requires_both_subgraphs() {
        let config = SdkConfig {
            core_subgraph: Some("https://core.example.org/graphql".to_string()),
            ..SdkConfig::default()
        };
        let runtime = ActionRuntime::from_config(&config).expect("runtime");
        assert!(matches!(
            DisputeLoader::from_config(&config, runtime),
            Err(PipelineError::MissingEndpoint("dispute template registry"))
        ));
    }
}
