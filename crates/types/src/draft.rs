//! Authoring-side dispute template builder.
//!
//! Dispute creators fill in answers with decimal ids and a free-form list of
//! address aliases. Before the template is registered on-chain it is normalized
//! into the [`DisputeDetails`] wire shape.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dispute::{Answer, DisputeDetails, QuestionType, ValidationError, is_address, parse_ruling_id};

/// Named address entered by the dispute creator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub name: String,
    pub address: String,
}

/// Chain and contract addresses stamped into every new template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArbitrationDeployment {
    pub chain_id: u64,
    pub arbitrator_address: String,
    pub arbitrable_address: String,
}

/// Dispute template as edited before submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeTemplateDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub question: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default, rename = "policyURI")]
    pub policy_uri: Option<String>,
    #[serde(default)]
    pub frontend_url: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub specification: Option<String>,
    #[serde(default)]
    pub aliases: Vec<AliasEntry>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl DisputeTemplateDraft {
    /// Normalizes the draft into a registrable template.
    ///
    /// - answer ids are rewritten as `0x`-prefixed hex
    /// - an empty `policyURI` is dropped
    /// - aliases with blank names or non-address values are skipped
    /// - chain and contract fields come from `deployment`
    pub fn build(&self, deployment: &ArbitrationDeployment) -> Result<DisputeDetails, ValidationError> {
        let answers = self
            .answers
            .iter()
            .map(|answer| -> Result<Answer, ValidationError> {
                let ruling = parse_ruling_id(&answer.id).ok_or_else(|| ValidationError::InvalidAnswerId { id: answer.id.clone() })?;
                Ok(Answer {
                    id: format!("0x{ruling:x}"),
                    ..answer.clone()
                })
            })
            .collect::<Result<Vec<_>, ValidationError>>()?;

        let aliases = self
            .aliases
            .iter()
            .filter(|alias| !alias.name.trim().is_empty() && is_address(alias.address.trim()))
            .map(|alias| (alias.name.trim().to_string(), alias.address.trim().to_string()))
            .collect::<IndexMap<_, _>>();

        let chain_id = deployment.chain_id.to_string();
        let details = DisputeDetails {
            title: self.title.clone(),
            description: self.description.clone(),
            question: self.question.clone(),
            r#type: QuestionType::SingleSelect,
            answers,
            policy_uri: self.policy_uri.clone().filter(|uri| !uri.trim().is_empty()),
            attachment: None,
            frontend_url: self.frontend_url.clone().filter(|url| !url.trim().is_empty()),
            arbitrable_chain_id: chain_id.clone(),
            arbitrable_address: Some(deployment.arbitrable_address.clone()),
            arbitrator_chain_id: chain_id,
            arbitrator_address: deployment.arbitrator_address.clone(),
            category: self.category.clone(),
            lang: self.lang.clone(),
            specification: self.specification.clone(),
            aliases: (!aliases.is_empty()).then_some(aliases),
            version: self.version.clone(),
        };
        details.validate()?;
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn deployment() -> ArbitrationDeployment {
        ArbitrationDeployment {
            chain_id: 421614,
            arbitrator_address: "0x1c00fEcbb4Eb1d6fB1bcb3B2fcE3B2BAf6E3Ea4a".to_string(),
            arbitrable_address: "0x2d11aaAbbbCCcdDdEEeFff0001112223334445a6".to_string(),
        }
    }

    fn draft() -> DisputeTemplateDraft {
        serde_json::from_value(json!({
            "title": "Curated list removal",
            "description": "Should the entry be removed?",
            "question": "Remove the entry?",
            "category": "Curation",
            "answers": [
                { "id": "1", "title": "Yes", "description": "Remove it" },
                { "id": "2", "title": "No", "description": "Keep it" },
                { "id": "10", "title": "Partially", "description": "Edit it" }
            ],
            "policyURI": "",
            "aliases": [
                { "name": "Challenger", "address": "0x1111111111111111111111111111111111111111" },
                { "name": "", "address": "0x2222222222222222222222222222222222222222" },
                { "name": "Submitter", "address": "not-an-address" }
            ]
        }))
        .expect("draft")
    }

    #[test]
    fn build_normalizes_answer_ids_and_aliases() {
        let details = draft().build(&deployment()).expect("build");

        let ids = details.answers.iter().map(|answer| answer.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["0x1", "0x2", "0xa"]);
        assert!(details.policy_uri.is_none());
        let aliases = details.aliases.expect("aliases kept");
        assert_eq!(aliases.len(), 1);
        assert!(aliases.contains_key("Challenger"));
        assert_eq!(details.arbitrable_chain_id, "421614");
        assert_eq!(details.arbitrator_chain_id, "421614");
    }

    #[test]
    fn build_drops_alias_map_when_nothing_valid() {
        let mut draft = draft();
        draft.aliases.clear();
        let details = draft.build(&deployment()).expect("build");
        assert!(details.aliases.is_none());
    }

    #[test]
    fn build_rejects_non_numeric_answer_ids() {
        let mut draft = draft();
        draft.answers[0].id = "yes".to_string();
        assert_eq!(
            draft.build(&deployment()),
            Err(ValidationError::InvalidAnswerId { id: "yes".to_string() })
        );
    }
}
