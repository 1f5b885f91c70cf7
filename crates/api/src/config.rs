//! SDK configuration: defaults, an optional YAML/JSON file, then environment overrides.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate_url;

pub const IPFS_GATEWAY_ENV_VAR: &str = "VERDICT_IPFS_GATEWAY";
pub const CORE_SUBGRAPH_ENV_VAR: &str = "VERDICT_CORE_SUBGRAPH";
pub const DTR_SUBGRAPH_ENV_VAR: &str = "VERDICT_DTR_SUBGRAPH";
pub const HTTP_TIMEOUT_ENV_VAR: &str = "VERDICT_HTTP_TIMEOUT_SECS";
pub const API_KEY_ENV_VAR: &str = "VERDICT_API_KEY";

pub const DEFAULT_IPFS_GATEWAY: &str = "https://cdn.kleros.link";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("invalid {HTTP_TIMEOUT_ENV_VAR} '{0}': expected a positive number of seconds")]
    InvalidTimeout(String),
}

/// Endpoints and transport settings used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SdkConfig {
    /// Gateway used to resolve `ipfs://` references.
    pub ipfs_gateway: String,
    /// Arbitrator core subgraph (disputes, template ids).
    pub core_subgraph: Option<String>,
    /// Dispute template registry subgraph.
    pub dtr_subgraph: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Sent as a bearer token to the core and template registry subgraph hosts.
    pub api_key: Option<String>,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            core_subgraph: None,
            dtr_subgraph: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("verdict-sdk/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            api_key: None,
        }
    }
}

impl SdkConfig {
    /// Resolve configuration from `path` (or the default location when it
    /// exists) and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file_path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => default_config_path().filter(|candidate| candidate.is_file()),
        };
        let mut config = match file_path {
            Some(file_path) => Self::from_file(&file_path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML or JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup such as `std::env::var`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let lookup = |name: &str| lookup(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());

        if let Some(gateway) = lookup(IPFS_GATEWAY_ENV_VAR) {
            self.ipfs_gateway = gateway;
        }
        if let Some(core) = lookup(CORE_SUBGRAPH_ENV_VAR) {
            self.core_subgraph = Some(core);
        }
        if let Some(dtr) = lookup(DTR_SUBGRAPH_ENV_VAR) {
            self.dtr_subgraph = Some(dtr);
        }
        if let Some(timeout) = lookup(HTTP_TIMEOUT_ENV_VAR) {
            self.request_timeout_secs = timeout
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(timeout))?;
        }
        if let Some(api_key) = lookup(API_KEY_ENV_VAR) {
            self.api_key = Some(api_key);
        }
        Ok(())
    }

    /// Check every configured URL against the transport rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ipfsGateway", Some(self.ipfs_gateway.as_str())),
            ("coreSubgraph", self.core_subgraph.as_deref()),
            ("dtrSubgraph", self.dtr_subgraph.as_deref()),
        ];
        for (field, value) in fields {
            if let Some(url) = value {
                validate_url(url).map_err(|error| ConfigError::InvalidUrl {
                    field,
                    reason: error.to_string(),
                })?;
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("0".to_string()));
        }
        Ok(())
    }
}

/// `<config dir>/verdict/config.yaml`, when a config directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("verdict").join(CONFIG_FILE_NAME))
}
