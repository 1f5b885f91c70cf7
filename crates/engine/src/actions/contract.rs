//! `abi/call` and `abi/event` actions, plus the contract readers that ship
//! with the engine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use verdict_types::{AbiCallMapping, AbiEventMapping};
use verdict_util::format_json_value;

use super::ContractReader;
use crate::error::ActionError;

pub async fn execute_call(mapping: &AbiCallMapping, reader: &dyn ContractReader) -> Result<Value, ActionError> {
    reader.call(mapping).await.map_err(|source| ActionError::Contract {
        address: mapping.address.clone(),
        source,
    })
}

/// The first matching log's arguments become the source value.
pub async fn execute_event(mapping: &AbiEventMapping, reader: &dyn ContractReader) -> Result<Value, ActionError> {
    let logs = reader.read_events(mapping).await.map_err(|source| ActionError::Contract {
        address: mapping.address.clone(),
        source,
    })?;
    debug!(address = %mapping.address, log_count = logs.len(), "event logs read");
    logs.into_iter().next().ok_or_else(|| ActionError::NoEvents {
        address: mapping.address.clone(),
    })
}

/// Name declared by a human-readable ABI item such as
/// `function appealCost(uint256) view returns (uint256)`.
pub fn abi_item_name(abi: &str) -> Option<&str> {
    let trimmed = abi.trim();
    let declaration = trimmed
        .strip_prefix("function ")
        .or_else(|| trimmed.strip_prefix("event "))
        .unwrap_or(trimmed)
        .trim_start();
    let name = declaration.split('(').next()?.trim();
    (!name.is_empty() && !name.contains(char::is_whitespace)).then_some(name)
}

/// Reader used when no chain access is configured; every read fails.
pub struct UnconfiguredContractReader;

#[async_trait]
impl ContractReader for UnconfiguredContractReader {
    async fn call(&self, mapping: &AbiCallMapping) -> Result<Value> {
        Err(anyhow!(
            "no contract reader configured for abi/call on {}; supply one to read chain state",
            mapping.address
        ))
    }

    async fn read_events(&self, mapping: &AbiEventMapping) -> Result<Vec<Value>> {
        Err(anyhow!(
            "no contract reader configured for abi/event on {}; supply one to read chain state",
            mapping.address
        ))
    }
}

/// Reader answering from fixed values, loaded from a YAML or JSON file.
///
/// ```yaml
/// calls:
///   - address: "0x1111111111111111111111111111111111111111"
///     function: appealCost
///     result: "2500000000000000"
/// events:
///   - address: "0x2222222222222222222222222222222222222222"
///     event: DisputeRequest
///     logs:
///       - { _arbitratorDisputeID: "7", _templateId: "3" }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaticContractReader {
    pub calls: Vec<StaticCall>,
    pub events: Vec<StaticEvents>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticCall {
    pub address: String,
    pub function: String,
    /// Only match calls with these arguments; any arguments when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Value>>,
    pub result: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StaticEvents {
    pub address: String,
    pub event: String,
    pub logs: Vec<Value>,
}

impl StaticContractReader {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).with_context(|| format!("read contract values {}", path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("parse contract values {}", path.display()))
    }

    pub fn with_call(mut self, address: impl Into<String>, function: impl Into<String>, result: Value) -> Self {
        self.calls.push(StaticCall {
            address: address.into(),
            function: function.into(),
            args: None,
            result,
        });
        self
    }

    pub fn with_events(mut self, address: impl Into<String>, event: impl Into<String>, logs: Vec<Value>) -> Self {
        self.events.push(StaticEvents {
            address: address.into(),
            event: event.into(),
            logs,
        });
        self
    }
}

#[async_trait]
impl ContractReader for StaticContractReader {
    async fn call(&self, mapping: &AbiCallMapping) -> Result<Value> {
        let function = mapping
            .function_name
            .as_deref()
            .or_else(|| abi_item_name(&mapping.abi))
            .ok_or_else(|| anyhow!("cannot determine the function name from '{}'", mapping.abi))?;

        self.calls
            .iter()
            .find(|call| {
                call.address.eq_ignore_ascii_case(&mapping.address)
                    && call.function == function
                    && call.args.as_ref().is_none_or(|args| same_values(args, &mapping.args))
            })
            .map(|call| call.result.clone())
            .ok_or_else(|| anyhow!("no recorded result for {}() on {}", function, mapping.address))
    }

    async fn read_events(&self, mapping: &AbiEventMapping) -> Result<Vec<Value>> {
        let event = abi_item_name(&mapping.abi).ok_or_else(|| anyhow!("cannot determine the event name from '{}'", mapping.abi))?;

        let logs = self
            .events
            .iter()
            .filter(|recorded| recorded.address.eq_ignore_ascii_case(&mapping.address) && recorded.event == event)
            .flat_map(|recorded| recorded.logs.iter())
            .filter(|log| {
                mapping
                    .event_filter
                    .args
                    .iter()
                    .all(|(name, expected)| log.get(name).is_some_and(|actual| same_value(actual, expected)))
            })
            .cloned()
            .collect();
        Ok(logs)
    }
}

/// Compares by text form so `"7"` matches `7`.
fn same_value(left: &Value, right: &Value) -> bool {
    format_json_value(left) == format_json_value(right)
}

fn same_values(left: &[Value], right: &[Value]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(left, right)| same_value(left, right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use verdict_types::{EventFilter, ResultSpec};

    const ARBITRATOR: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ARBITRABLE: &str = "0x2222222222222222222222222222222222222222";

    fn call_mapping(args: Vec<Value>) -> AbiCallMapping {
        AbiCallMapping {
            abi: "function appealCost(uint256 _disputeID, bytes _extraData) view returns (uint256)".to_string(),
            address: ARBITRATOR.to_uppercase().replace("0X", "0x"),
            function_name: None,
            args,
            chain_id: None,
            result: ResultSpec::new([""], ["appealCost"]),
        }
    }

    fn event_mapping(filter_args: Value) -> AbiEventMapping {
        AbiEventMapping {
            abi: "event DisputeRequest(address indexed _arbitrator, uint256 indexed _arbitratorDisputeID, uint256 _externalDisputeID, uint256 _templateId, string _templateUri)".to_string(),
            address: ARBITRABLE.to_string(),
            event_filter: EventFilter {
                from_block: Some(json!("earliest")),
                to_block: Some(json!("latest")),
                args: serde_json::from_value(filter_args).expect("filter args"),
            },
            chain_id: Some(421614),
            result: ResultSpec::new(["_templateId"], ["templateId"]),
        }
    }

    #[test]
    fn abi_item_name_reads_functions_and_events() {
        assert_eq!(abi_item_name("function appealCost(uint256) view returns (uint256)"), Some("appealCost"));
        assert_eq!(abi_item_name("event Ruling(address indexed _arbitrator, uint256 _ruling)"), Some("Ruling"));
        assert_eq!(abi_item_name("currentRuling(uint256)"), Some("currentRuling"));
        assert_eq!(abi_item_name("   "), None);
    }

    #[tokio::test]
    async fn static_reader_matches_address_case_insensitively() {
        let reader = StaticContractReader::default().with_call(ARBITRATOR, "appealCost", json!("2500"));
        let value = execute_call(&call_mapping(vec![json!(7), json!("0x")]), &reader).await.expect("call");
        assert_eq!(value, json!("2500"));
    }

    #[tokio::test]
    async fn static_reader_respects_recorded_arguments() {
        let mut reader = StaticContractReader::default();
        reader.calls.push(StaticCall {
            address: ARBITRATOR.to_string(),
            function: "appealCost".to_string(),
            args: Some(vec![json!("7"), json!("0x")]),
            result: json!("2500"),
        });

        assert!(execute_call(&call_mapping(vec![json!(7), json!("0x")]), &reader).await.is_ok());
        let error = execute_call(&call_mapping(vec![json!(8), json!("0x")]), &reader).await.unwrap_err();
        assert!(matches!(error, ActionError::Contract { .. }));
    }

    #[tokio::test]
    async fn events_filter_on_indexed_arguments() {
        let reader = StaticContractReader::default().with_events(
            ARBITRABLE,
            "DisputeRequest",
            vec![
                json!({ "_arbitratorDisputeID": "6", "_templateId": "1" }),
                json!({ "_arbitratorDisputeID": "7", "_templateId": "3" }),
            ],
        );

        let first = execute_event(&event_mapping(json!({ "_arbitratorDisputeID": 7 })), &reader)
            .await
            .expect("event");
        assert_eq!(first["_templateId"], json!("3"));

        let missing = execute_event(&event_mapping(json!({ "_arbitratorDisputeID": 9 })), &reader).await;
        assert!(matches!(missing, Err(ActionError::NoEvents { .. })));
    }

    #[tokio::test]
    async fn unconfigured_reader_always_fails() {
        let error = execute_call(&call_mapping(Vec::new()), &UnconfiguredContractReader).await.unwrap_err();
        assert!(error.to_string().contains("no contract reader configured"));
    }

    #[test]
    fn loads_recorded_values_from_yaml() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("contracts.yaml");
        fs::write(
            &path,
            format!("calls:\n  - address: \"{ARBITRATOR}\"\n    function: appealCost\n    result: \"2500\"\n"),
        )
        .expect("write contracts");

        let reader = StaticContractReader::from_file(&path).expect("load");
        assert_eq!(reader.calls.len(), 1);
        assert!(reader.events.is_empty());
    }
}
