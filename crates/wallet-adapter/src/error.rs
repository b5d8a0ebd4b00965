use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The adapter operation an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Connect,
    Disconnect,
    SwitchChain,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Connect => write!(f, "connect"),
            Operation::Disconnect => write!(f, "disconnect"),
            Operation::SwitchChain => write!(f, "switch_chain"),
        }
    }
}

/// Failure reported by a wallet extension integration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExtensionError(pub String);

impl ExtensionError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Wallet adapter errors.
///
/// Precondition failures (`IncompatibleWallet`, `NotConnected`,
/// `ChainUnavailable`) are raised before any extension call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("wallet {wallet} is not compatible with {chain}")]
    IncompatibleWallet { wallet: String, chain: String },

    #[error("no wallet connected")]
    NotConnected,

    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),

    #[error("connect failed: {0}")]
    ExternalConnectFailure(String),

    #[error("disconnect failed: {0}")]
    ExternalDisconnectFailure(String),

    #[error("switch chain failed: {0}")]
    ExternalSwitchFailure(String),
}

impl AdapterError {
    /// Wrap an extension failure in the variant matching the operation it broke.
    pub fn external(op: Operation, err: ExtensionError) -> Self {
        match op {
            Operation::Connect => AdapterError::ExternalConnectFailure(err.0),
            Operation::Disconnect => AdapterError::ExternalDisconnectFailure(err.0),
            Operation::SwitchChain => AdapterError::ExternalSwitchFailure(err.0),
        }
    }
}
