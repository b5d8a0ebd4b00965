use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::registry::ChainRegistry;

pub const NETWORK_VAR: &str = "WALLET_CONNECT_NETWORK";
pub const PROJECT_ID_VAR: &str = "WALLETCONNECT_PROJECT_ID";
pub const CHAINS_FILE_VAR: &str = "WALLET_CONNECT_CHAINS";

/// Which chain preset to load when no chains file is configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Mainnet,
    #[default]
    Devnet,
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkMode::Mainnet => write!(f, "mainnet"),
            NetworkMode::Devnet => write!(f, "devnet"),
        }
    }
}

impl FromStr for NetworkMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkMode::Mainnet),
            "devnet" => Ok(NetworkMode::Devnet),
            _ => Err(ConfigError::InvalidNetwork(s.to_string())),
        }
    }
}

/// Host-supplied settings for the connection core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectConfig {
    pub network: NetworkMode,
    pub walletconnect_project_id: Option<String>,
    /// JSON chain metadata that replaces the network preset.
    pub chains_file: Option<PathBuf>,
}

impl ConnectConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let network = match get(NETWORK_VAR) {
            Some(value) => value.parse()?,
            None => NetworkMode::default(),
        };

        Ok(Self {
            network,
            walletconnect_project_id: get(PROJECT_ID_VAR).map(|v| v.trim().to_string()),
            chains_file: get(CHAINS_FILE_VAR).map(PathBuf::from),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the chains file if one is configured, else the network preset.
    pub fn chain_registry(&self) -> Result<ChainRegistry, ConfigError> {
        let Some(path) = &self.chains_file else {
            debug!(network = %self.network, "using chain preset");
            return Ok(match self.network {
                NetworkMode::Mainnet => ChainRegistry::mainnet(),
                NetworkMode::Devnet => ChainRegistry::devnet(),
            });
        };

        debug!(path = %path.display(), "loading chain metadata");
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(ChainRegistry::from_json(&json)?)
    }
}
