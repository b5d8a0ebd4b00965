use thiserror::Error;
use wallet_adapter::{AdapterError, ChainFamily, ChainId};

use crate::controller::ConnectionPhase;

/// Connection core errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("no chains provided")]
    NoChainsProvided,

    #[error("unsupported chain family: {0}")]
    UnsupportedFamily(ChainFamily),

    #[error("another connection operation is in progress")]
    OperationInProgress,

    #[error("unknown chain: {0}")]
    UnknownChain(ChainId),

    #[error("duplicate chain: {0}")]
    DuplicateChain(ChainId),

    #[error("invalid chain {chain}: {reason}")]
    InvalidChain { chain: String, reason: String },

    #[error("invalid chain metadata: {0}")]
    Metadata(String),

    #[error("{operation} is not allowed while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: ConnectionPhase,
    },

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid network mode: {0}")]
    InvalidNetwork(String),

    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error(transparent)]
    Chains(#[from] ConnectError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
