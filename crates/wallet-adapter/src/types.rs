use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The two wallet/connectivity models a chain can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Evm,
    Solana,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "evm",
            ChainFamily::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evm" => Ok(ChainFamily::Evm),
            "solana" => Ok(ChainFamily::Solana),
            other => Err(format!("unknown chain family: {other}")),
        }
    }
}

/// Stable chain identifier: numeric for EVM, string for Solana.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Evm(u64),
    Solana(String),
}

impl ChainId {
    pub fn family(&self) -> ChainFamily {
        match self {
            ChainId::Evm(_) => ChainFamily::Evm,
            ChainId::Solana(_) => ChainFamily::Solana,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainId::Evm(id) => write!(f, "{id}"),
            ChainId::Solana(id) => f.write_str(id),
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId::Evm(id)
    }
}

impl From<&str> for ChainId {
    fn from(id: &str) -> Self {
        ChainId::Solana(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn new(name: &str, symbol: &str, decimals: u8) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explorer {
    pub name: String,
    pub url: String,
}

/// Family-specific connectivity data. The variant decides the chain's family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Connectivity {
    Evm { rpc_urls: Vec<String> },
    Solana { endpoint: String },
}

/// A supported network. Looked up from the registry, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    pub id: ChainId,
    pub name: String,
    pub network: String,
    pub native_currency: NativeCurrency,
    pub testnet: bool,
    pub explorers: Vec<Explorer>,
    pub connectivity: Connectivity,
}

impl Chain {
    /// Build an EVM chain reachable through the given RPC endpoints.
    pub fn evm(chain_id: u64, name: &str, rpc_urls: Vec<String>, currency: NativeCurrency) -> Self {
        Self {
            id: ChainId::Evm(chain_id),
            name: name.into(),
            network: name.to_ascii_lowercase(),
            native_currency: currency,
            testnet: false,
            explorers: Vec::new(),
            connectivity: Connectivity::Evm { rpc_urls },
        }
    }

    /// Build a Solana chain served by a single cluster endpoint.
    pub fn solana(id: &str, name: &str, endpoint: &str, currency: NativeCurrency) -> Self {
        Self {
            id: ChainId::Solana(id.into()),
            name: name.into(),
            network: id.to_string(),
            native_currency: currency,
            testnet: false,
            explorers: Vec::new(),
            connectivity: Connectivity::Solana {
                endpoint: endpoint.into(),
            },
        }
    }

    pub fn with_network(mut self, network: &str) -> Self {
        self.network = network.into();
        self
    }

    pub fn with_testnet(mut self, testnet: bool) -> Self {
        self.testnet = testnet;
        self
    }

    pub fn with_explorer(mut self, name: &str, url: &str) -> Self {
        self.explorers.push(Explorer {
            name: name.into(),
            url: url.into(),
        });
        self
    }

    pub fn family(&self) -> ChainFamily {
        match self.connectivity {
            Connectivity::Evm { .. } => ChainFamily::Evm,
            Connectivity::Solana { .. } => ChainFamily::Solana,
        }
    }

    /// Numeric chain id for EVM chains, `None` for Solana.
    pub fn evm_chain_id(&self) -> Option<u64> {
        match self.id {
            ChainId::Evm(id) => Some(id),
            ChainId::Solana(_) => None,
        }
    }

    /// The endpoint a wallet session talks to: first RPC URL or the cluster endpoint.
    pub fn rpc_url(&self) -> Option<&str> {
        match &self.connectivity {
            Connectivity::Evm { rpc_urls } => rpc_urls.first().map(String::as_str),
            Connectivity::Solana { endpoint } => Some(endpoint.as_str()),
        }
    }

    /// Display name, falling back to the id when the name is blank.
    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            format!("Chain {}", self.id)
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.id)
    }
}

/// A wallet application the user can pick in the selection dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub supported_families: BTreeSet<ChainFamily>,
}

impl Wallet {
    pub fn new(
        id: &str,
        name: &str,
        icon: &str,
        families: impl IntoIterator<Item = ChainFamily>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
            supported_families: families.into_iter().collect(),
        }
    }

    pub fn supports(&self, family: ChainFamily) -> bool {
        self.supported_families.contains(&family)
    }

    /// A wallet is compatible with a chain iff it supports the chain's family.
    pub fn is_compatible(&self, chain: &Chain) -> bool {
        self.supports(chain.family())
    }
}

/// The (wallet, chain) pair an adapter currently holds, with the account
/// address the extension reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub wallet: Wallet,
    pub chain: Chain,
    pub account: String,
}
