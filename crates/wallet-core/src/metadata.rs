//! Chain metadata as supplied by the host application.
//!
//! Schema (JSON array of objects):
//!
//! ```json
//! { "id": 1, "family": "evm", "name": "Ethereum",
//!   "rpcUrls": ["https://..."], "nativeCurrency": { "name": "Ether", "symbol": "ETH", "decimals": 18 } }
//! { "id": "devnet", "family": "solana", "name": "Solana",
//!   "endpoint": "https://api.devnet.solana.com", "nativeCurrency": { ... } }
//! ```
//!
//! `network`, `testnet` and `blockExplorers` are optional on both families.

use serde::Deserialize;
use wallet_adapter::{Chain, ChainId, Connectivity, Explorer, NativeCurrency};

use crate::error::ConnectError;

#[derive(Debug, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
enum ChainRecord {
    #[serde(rename_all = "camelCase")]
    Evm {
        id: u64,
        name: String,
        #[serde(default)]
        network: Option<String>,
        rpc_urls: Vec<String>,
        native_currency: NativeCurrency,
        #[serde(default)]
        testnet: bool,
        #[serde(default)]
        block_explorers: Vec<Explorer>,
    },
    #[serde(rename_all = "camelCase")]
    Solana {
        id: String,
        name: String,
        #[serde(default)]
        network: Option<String>,
        endpoint: String,
        native_currency: NativeCurrency,
        #[serde(default)]
        testnet: bool,
        #[serde(default)]
        block_explorers: Vec<Explorer>,
    },
}

impl From<ChainRecord> for Chain {
    fn from(record: ChainRecord) -> Self {
        match record {
            ChainRecord::Evm {
                id,
                name,
                network,
                rpc_urls,
                native_currency,
                testnet,
                block_explorers,
            } => Chain {
                id: ChainId::Evm(id),
                network: network.unwrap_or_else(|| name.to_ascii_lowercase()),
                name,
                native_currency,
                testnet,
                explorers: block_explorers,
                connectivity: Connectivity::Evm { rpc_urls },
            },
            ChainRecord::Solana {
                id,
                name,
                network,
                endpoint,
                native_currency,
                testnet,
                block_explorers,
            } => Chain {
                network: network.unwrap_or_else(|| id.clone()),
                id: ChainId::Solana(id),
                name,
                native_currency,
                testnet,
                explorers: block_explorers,
                connectivity: Connectivity::Solana { endpoint },
            },
        }
    }
}

/// Parse a JSON chain list. Validation happens when the list is handed to
/// the registry.
pub fn parse_chains(json: &str) -> Result<Vec<Chain>, ConnectError> {
    let records: Vec<ChainRecord> =
        serde_json::from_str(json).map_err(|e| ConnectError::Metadata(e.to_string()))?;
    Ok(records.into_iter().map(Chain::from).collect())
}
