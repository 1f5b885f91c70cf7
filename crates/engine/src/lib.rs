//! # Verdict Engine
//!
//! Turns a dispute template plus its data mappings into the dispute text
//! shown to jurors.
//!
//! ## Flow
//!
//! 1. Parse the mapping list (`graphql`, `abi/call`, `abi/event`, `json`,
//!    `fetch/json`, `fetch/ipfs/json`).
//! 2. Run the mappings one after another. Each mapping's fields are rendered
//!    against the context so far, the action runs, and its `seek` values are
//!    stored under the `populate` keys.
//! 3. Render the template against the final context, check it as a
//!    [`DisputeDetails`], and prepend the reserved ruling-0 answer.
//!
//! Any failure stops the run with one [`PipelineError`]; a partially rendered
//! dispute is never returned.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use verdict_engine::{ActionRuntime, StaticContractReader, render_dispute};
//! use verdict_api::SdkConfig;
//! use verdict_types::DataContext;
//! use std::sync::Arc;
//!
//! let template = r#"{
//!   "title": "Escrow #{{ disputeID }}",
//!   "question": "Should {{ buyer }} be refunded?",
//!   "answers": [{ "id": "0x1", "title": "Yes" }, { "id": "0x2", "title": "No" }],
//!   "arbitrableChainID": "421614",
//!   "arbitratorChainID": "421614",
//!   "arbitratorAddress": "0x1111111111111111111111111111111111111111"
//! }"#;
//! let mappings = r#"[{ "type": "json", "value": { "buyer": "Alice" }, "seek": ["buyer"], "populate": ["buyer"] }]"#;
//!
//! let runtime = ActionRuntime::from_config(&SdkConfig::default())?
//!     .with_contract_reader(Arc::new(StaticContractReader::default()));
//! let context: DataContext = [("disputeID", json!("7"))].into_iter().collect();
//!
//! let rt = tokio::runtime::Runtime::new()?;
//! let dispute = rt.block_on(render_dispute(template, Some(mappings), context, &runtime))?;
//! assert_eq!(dispute.question, "Should Alice be refunded?");
//! assert_eq!(dispute.answers[0].title, "Refuse to Arbitrate");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result};
use verdict_types::DataMapping;

pub mod actions;
pub mod dispute;
pub mod error;
pub mod pipeline;
pub mod template;

pub use actions::{
    ActionRuntime, ContractReader, HttpJsonFetcher, JsonFetcher, StaticContractReader, UnconfiguredContractReader, create_result_object,
    execute_action,
};
pub use dispute::{DisputeLoader, initial_context};
pub use error::{ActionError, PipelineError, TemplateError};
pub use pipeline::{execute_actions, populate_template, render_dispute, substitute_mapping};
pub use template::{placeholders, render_value};
pub use verdict_types::DisputeDetails;

/// Parse a mapping list written as JSON or YAML.
pub fn parse_mappings(raw: &str) -> std::result::Result<Vec<DataMapping>, PipelineError> {
    serde_yaml::from_str(raw).map_err(PipelineError::InvalidMappings)
}

/// Load a mapping list from a `.json`, `.yaml`, or `.yml` file.
pub fn load_mappings_file(file_path: impl AsRef<Path>) -> Result<Vec<DataMapping>> {
    let file_path = file_path.as_ref();
    let content = fs::read_to_string(file_path).with_context(|| format!("Failed to read mappings file: {}", file_path.display()))?;
    parse_mappings(&content).with_context(|| format!("Failed to parse mappings file: {}", file_path.display()))
}
