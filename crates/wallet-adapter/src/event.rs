use serde::{Deserialize, Serialize};

use crate::types::ChainFamily;

/// Connection changes a wallet extension reports on its own, outside any
/// operation the application started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    /// The extension dropped the session (user disconnected, extension locked).
    Disconnected { family: ChainFamily },
    /// The user picked another account inside the extension.
    AccountChanged { family: ChainFamily, account: String },
    /// The user switched the EVM network inside the extension.
    NetworkChanged { chain_id: u64 },
}

impl WalletEvent {
    pub fn family(&self) -> ChainFamily {
        match self {
            WalletEvent::Disconnected { family } | WalletEvent::AccountChanged { family, .. } => {
                *family
            }
            WalletEvent::NetworkChanged { .. } => ChainFamily::Evm,
        }
    }
}
