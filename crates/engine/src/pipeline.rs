//! Sequential execution of data mappings and population of the template.

use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info, warn};
use verdict_types::{DataContext, DataMapping, DisputeDetails};

use crate::actions::{ActionRuntime, create_result_object, execute_action};
use crate::error::{ActionError, PipelineError};
use crate::parse_mappings;
use crate::template::render_value;

/// Run `mappings` in order, merging each result into the context.
///
/// Each mapping's own fields are rendered against the context built so far,
/// so later mappings can use values produced by earlier ones. Stops at the
/// first failure; the error names the mapping's position and kind.
pub async fn execute_actions(
    mappings: &[DataMapping],
    initial_context: DataContext,
    runtime: &ActionRuntime,
) -> Result<DataContext, PipelineError> {
    let mut context = initial_context;
    for (index, mapping) in mappings.iter().enumerate() {
        let kind = mapping.kind();
        let start = Instant::now();
        let populated = run_mapping(mapping, &context, runtime).await.map_err(|source| {
            warn!(
                index,
                kind = %kind,
                duration_ms = start.elapsed().as_millis(),
                error = %source,
                "data mapping failed"
            );
            PipelineError::Action { index, kind, source }
        })?;
        info!(
            index,
            kind = %kind,
            populated = populated.len(),
            duration_ms = start.elapsed().as_millis(),
            "data mapping completed"
        );
        context.extend(populated);
    }
    Ok(context)
}

async fn run_mapping(
    mapping: &DataMapping,
    context: &DataContext,
    runtime: &ActionRuntime,
) -> Result<IndexMap<String, Value>, ActionError> {
    let resolved = substitute_mapping(mapping, context)?;
    let source = execute_action(&resolved, runtime).await?;
    create_result_object(&source, resolved.result_spec())
}

/// Render every string field of `mapping` against `context`.
pub fn substitute_mapping(mapping: &DataMapping, context: &DataContext) -> Result<DataMapping, ActionError> {
    let raw = serde_json::to_value(mapping).map_err(ActionError::InvalidMapping)?;
    let rendered = render_value(&raw, context)?;
    serde_json::from_value(rendered).map_err(ActionError::InvalidMapping)
}

/// Render a template document and check it as a dispute.
///
/// The reserved "Refuse to Arbitrate" answer is prepended to the result.
pub fn populate_template(template_json: &str, context: &DataContext) -> Result<DisputeDetails, PipelineError> {
    let template: Value = serde_json::from_str(template_json).map_err(PipelineError::InvalidTemplate)?;
    let rendered = render_value(&template, context)?;
    let details: DisputeDetails = serde_json::from_value(rendered).map_err(PipelineError::InvalidTemplate)?;
    details.validate()?;
    debug!(answers = details.answers.len(), "template populated");
    Ok(details.with_reserved_answer())
}

/// Execute the mappings (absent or blank means none) and populate the template.
pub async fn render_dispute(
    template_json: &str,
    mappings_json: Option<&str>,
    initial_context: DataContext,
    runtime: &ActionRuntime,
) -> Result<DisputeDetails, PipelineError> {
    let mappings = match mappings_json.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_mappings(raw)?,
        None => Vec::new(),
    };
    let context = execute_actions(&mappings, initial_context, runtime).await?;
    populate_template(template_json, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_types::{FetchJsonMapping, ResultSpec, SubgraphMapping};

    #[test]
    fn substitute_mapping_renders_nested_fields() {
        let mapping = DataMapping::Subgraph(SubgraphMapping {
            endpoint: "https://{{host}}/subgraphs/core".to_string(),
            query: "query($id: ID!) { dispute(id: $id) { id } }".to_string(),
            variables: serde_json::from_value(json!({ "id": "{{disputeID}}" })).expect("variables"),
            result: ResultSpec::new(["dispute.id"], ["id"]),
        });
        let context: DataContext = [("host", json!("core.example.org")), ("disputeID", json!(12))].into_iter().collect();

        let DataMapping::Subgraph(resolved) = substitute_mapping(&mapping, &context).expect("substitute") else {
            panic!("kind must survive substitution");
        };
        assert_eq!(resolved.endpoint, "https://core.example.org/subgraphs/core");
        assert_eq!(resolved.variables["id"], json!(12));
    }

    #[test]
    fn substitute_mapping_fails_on_unknown_placeholder() {
        let mapping = DataMapping::FetchJson(FetchJsonMapping {
            url: "https://example.org/{{ missing }}.json".to_string(),
            result: ResultSpec::new([""], ["doc"]),
        });
        let error = substitute_mapping(&mapping, &DataContext::new()).unwrap_err();
        assert!(matches!(error, ActionError::Render(_)));
    }

    #[test]
    fn substitute_mapping_rejects_wrongly_typed_values() {
        let mapping = DataMapping::FetchJson(FetchJsonMapping {
            url: "{{ target }}".to_string(),
            result: ResultSpec::new([""], ["doc"]),
        });
        let context: DataContext = [("target", json!({ "not": "a url" }))].into_iter().collect();
        assert!(matches!(substitute_mapping(&mapping, &context), Err(ActionError::InvalidMapping(_))));
    }

    #[test]
    fn populate_template_rejects_non_json() {
        let error = populate_template("{ title: {{title}} }", &DataContext::new()).unwrap_err();
        assert!(matches!(error, PipelineError::InvalidTemplate(_)));
    }
}
