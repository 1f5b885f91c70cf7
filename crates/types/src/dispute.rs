//! Rendered dispute description shown to jurors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Title shown for ruling `0`.
pub const REFUSE_TO_ARBITRATE_TITLE: &str = "Refuse to Arbitrate";

/// Final, fully substituted dispute document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeDetails {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub question: String,
    #[serde(default)]
    pub r#type: QuestionType,
    pub answers: Vec<Answer>,
    #[serde(default, rename = "policyURI", skip_serializing_if = "Option::is_none")]
    pub policy_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_url: Option<String>,
    #[serde(rename = "arbitrableChainID")]
    pub arbitrable_chain_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arbitrable_address: Option<String>,
    #[serde(rename = "arbitratorChainID")]
    pub arbitrator_chain_id: String,
    pub arbitrator_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
    /// Human-readable names for addresses mentioned in the dispute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<IndexMap<String, String>>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// Shape of the answer a juror is asked to give.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Bool,
    Datetime,
    MultipleSelect,
    #[default]
    SingleSelect,
    Uint,
    Int,
    String,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Ruling value as a `0x`-prefixed hex string.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Set for answers injected by the platform rather than the template author.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reserved: bool,
}

impl Answer {
    /// The reserved ruling-0 answer every dispute carries.
    pub fn refuse_to_arbitrate() -> Self {
        Self {
            id: "0x0".to_string(),
            title: REFUSE_TO_ARBITRATE_TITLE.to_string(),
            description: "Refuse to Arbitrate or Invalid".to_string(),
            reserved: true,
        }
    }

    /// Parsed ruling value, if `id` is valid hex or decimal.
    pub fn ruling(&self) -> Option<u128> {
        parse_ruling_id(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub label: String,
    pub uri: String,
}

/// Problems found while checking a rendered dispute.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("dispute field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("dispute must declare at least one answer")]
    NoAnswers,
    #[error("answer id '{id}' is not a hex or decimal integer")]
    InvalidAnswerId { id: String },
    #[error("answer id '{id}' is declared more than once")]
    DuplicateAnswerId { id: String },
    #[error("field '{field}' is not an address: '{value}'")]
    InvalidAddress { field: String, value: String },
    #[error("field '{field}' is not a chain id: '{value}'")]
    InvalidChainId { field: &'static str, value: String },
    #[error("field '{field}' is not a valid URL: '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

impl DisputeDetails {
    /// Checks the invariants jurors rely on when reading a dispute.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        if self.question.trim().is_empty() {
            return Err(ValidationError::EmptyField("question"));
        }
        if self.answers.is_empty() {
            return Err(ValidationError::NoAnswers);
        }

        let mut seen = Vec::with_capacity(self.answers.len());
        for answer in &self.answers {
            let ruling = answer
                .ruling()
                .ok_or_else(|| ValidationError::InvalidAnswerId { id: answer.id.clone() })?;
            if seen.contains(&ruling) {
                return Err(ValidationError::DuplicateAnswerId { id: answer.id.clone() });
            }
            seen.push(ruling);
        }

        check_chain_id("arbitrableChainID", &self.arbitrable_chain_id)?;
        check_chain_id("arbitratorChainID", &self.arbitrator_chain_id)?;
        check_address("arbitratorAddress", &self.arbitrator_address)?;
        if let Some(address) = &self.arbitrable_address {
            check_address("arbitrableAddress", address)?;
        }
        if let Some(aliases) = &self.aliases {
            for (name, address) in aliases {
                check_address(&format!("aliases.{name}"), address)?;
            }
        }
        if let Some(frontend_url) = &self.frontend_url
            && Url::parse(frontend_url).is_err()
        {
            return Err(ValidationError::InvalidUrl {
                field: "frontendUrl",
                value: frontend_url.clone(),
            });
        }
        Ok(())
    }

    /// Prepends the reserved ruling-0 answer unless the template already declares one.
    pub fn with_reserved_answer(mut self) -> Self {
        let has_ruling_zero = self.answers.iter().any(|answer| answer.ruling() == Some(0));
        if !has_ruling_zero {
            self.answers.insert(0, Answer::refuse_to_arbitrate());
        }
        self
    }

    /// Human-readable label for a ruling value.
    ///
    /// Ruling `0` always means refusal. Other rulings resolve only to the answer
    /// whose id matches; unknown rulings are labelled `Answer 0x<hex>`.
    pub fn vote_choice(&self, ruling: u128) -> String {
        if ruling == 0 {
            return REFUSE_TO_ARBITRATE_TITLE.to_string();
        }
        self.answers
            .iter()
            .find(|answer| answer.ruling() == Some(ruling))
            .map(|answer| answer.title.clone())
            .unwrap_or_else(|| format!("Answer 0x{ruling:x}"))
    }
}

/// Parses a ruling id written as `0x`-prefixed hex or plain decimal.
pub fn parse_ruling_id(raw: &str) -> Option<u128> {
    let trimmed = raw.trim();
    if let Some(hex) = trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        return u128::from_str_radix(hex, 16).ok();
    }
    trimmed.parse::<u128>().ok()
}

/// True for `0x` followed by exactly 40 hex digits.
pub fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn check_address(field: &str, value: &str) -> Result<(), ValidationError> {
    if is_address(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn check_chain_id(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidChainId {
            field,
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DisputeDetails {
        serde_json::from_value(json!({
            "title": "Escrow dispute",
            "description": "Buyer claims non-delivery",
            "question": "Should the buyer be refunded?",
            "type": "single-select",
            "answers": [
                { "id": "0x1", "title": "Refund buyer", "description": "Pay the buyer back" },
                { "id": "0x2", "title": "Pay seller", "description": "Release funds" }
            ],
            "policyURI": "/ipfs/QmPolicy/policy.json",
            "arbitrableChainID": "421614",
            "arbitratorChainID": "421614",
            "arbitratorAddress": "0xA54e7A16d7460e38a8F324eF46782FB520d58CE8",
            "aliases": { "Buyer": "0x1111111111111111111111111111111111111111" },
            "version": "1.0"
        }))
        .expect("sample dispute")
    }

    #[test]
    fn valid_dispute_passes() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let encoded = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(encoded["policyURI"], json!("/ipfs/QmPolicy/policy.json"));
        assert_eq!(encoded["arbitrableChainID"], json!("421614"));
        assert!(encoded.get("attachment").is_none());
        assert!(encoded["answers"][0].get("reserved").is_none());
    }

    #[test]
    fn rejects_duplicate_answer_ids() {
        let mut dispute = sample();
        dispute.answers[1].id = "1".to_string();
        assert_eq!(
            dispute.validate(),
            Err(ValidationError::DuplicateAnswerId { id: "1".to_string() })
        );
    }

    #[test]
    fn rejects_malformed_alias_address() {
        let mut dispute = sample();
        dispute
            .aliases
            .get_or_insert_with(IndexMap::new)
            .insert("Seller".to_string(), "0x123".to_string());
        assert!(matches!(
            dispute.validate(),
            Err(ValidationError::InvalidAddress { field, .. }) if field == "aliases.Seller"
        ));
    }

    #[test]
    fn rejects_blank_question() {
        let mut dispute = sample();
        dispute.question = "   ".to_string();
        assert_eq!(dispute.validate(), Err(ValidationError::EmptyField("question")));
    }

    #[test]
    fn reserved_answer_is_prepended_once() {
        let dispute = sample().with_reserved_answer();
        assert_eq!(dispute.answers.len(), 3);
        assert!(dispute.answers[0].reserved);
        assert_eq!(dispute.answers[0].id, "0x0");

        let again = dispute.with_reserved_answer();
        assert_eq!(again.answers.len(), 3);
    }

    #[test]
    fn vote_choice_resolves_titles() {
        let dispute = sample().with_reserved_answer();
        assert_eq!(dispute.vote_choice(0), REFUSE_TO_ARBITRATE_TITLE);
        assert_eq!(dispute.vote_choice(1), "Refund buyer");
        assert_eq!(dispute.vote_choice(2), "Pay seller");
        assert_eq!(dispute.vote_choice(26), "Answer 0x1a");
    }

    #[test]
    fn vote_choice_ignores_answer_positions() {
        let mut dispute = sample();
        dispute.answers[0].id = "0x5".to_string();
        dispute.answers[0].title = "Five".to_string();
        dispute.answers[1].id = "0x6".to_string();
        dispute.answers[1].title = "Six".to_string();
        let dispute = dispute.with_reserved_answer();

        assert_eq!(dispute.vote_choice(1), "Answer 0x1");
        assert_eq!(dispute.vote_choice(2), "Answer 0x2");
        assert_eq!(dispute.vote_choice(5), "Five");
        assert_eq!(dispute.vote_choice(6), "Six");
    }

    #[test]
    fn parse_ruling_id_accepts_hex_and_decimal() {
        assert_eq!(parse_ruling_id("0x1f"), Some(31));
        assert_eq!(parse_ruling_id("12"), Some(12));
        assert_eq!(parse_ruling_id("0xzz"), None);
        assert_eq!(parse_ruling_id(""), None);
    }
}
