use std::collections::HashSet;

use chain_eth::chains as evm;
use chain_sol::clusters as sol;
use wallet_adapter::{Chain, ChainFamily, ChainId, Connectivity};

use crate::error::ConnectError;
use crate::metadata;

/// Static, ordered description of the supported chains.
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    chains: Vec<Chain>,
}

impl ChainRegistry {
    /// Validate and index a caller-supplied chain list.
    pub fn new(chains: Vec<Chain>) -> Result<Self, ConnectError> {
        if chains.is_empty() {
            return Err(ConnectError::NoChainsProvided);
        }

        let mut seen = HashSet::new();
        for chain in &chains {
            validate_chain(chain)?;
            if !seen.insert(chain.id.clone()) {
                return Err(ConnectError::DuplicateChain(chain.id.clone()));
            }
        }

        Ok(Self { chains })
    }

    /// Load a registry from the JSON metadata schema.
    pub fn from_json(json: &str) -> Result<Self, ConnectError> {
        Self::new(metadata::parse_chains(json)?)
    }

    /// Ethereum, Base and Solana mainnet-beta.
    pub fn mainnet() -> Self {
        Self {
            chains: vec![
                evm::ETHEREUM.to_chain(),
                evm::BASE.to_chain(),
                sol::MAINNET_BETA.to_chain(),
            ],
        }
    }

    /// Sepolia, Base Sepolia and Solana devnet.
    pub fn devnet() -> Self {
        Self {
            chains: vec![
                evm::SEPOLIA.to_chain(),
                evm::BASE_SEPOLIA.to_chain(),
                sol::DEVNET.to_chain(),
            ],
        }
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Chains in registry order, optionally restricted to one family.
    pub fn list_chains(&self, family: Option<ChainFamily>) -> Vec<&Chain> {
        self.chains
            .iter()
            .filter(|c| family.map_or(true, |f| c.family() == f))
            .collect()
    }

    pub fn find_chain(&self, id: &ChainId) -> Option<&Chain> {
        self.chains.iter().find(|c| &c.id == id)
    }

    /// The first listed chain of `family`.
    pub fn default_chain(&self, family: ChainFamily) -> Option<&Chain> {
        self.chains.iter().find(|c| c.family() == family)
    }

    /// Distinct families, in order of first appearance.
    pub fn families(&self) -> Vec<ChainFamily> {
        let mut families = Vec::new();
        for chain in &self.chains {
            if !families.contains(&chain.family()) {
                families.push(chain.family());
            }
        }
        families
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

/// Reject chain definitions a wallet could never connect to.
pub fn validate_chain(chain: &Chain) -> Result<(), ConnectError> {
    let invalid = |reason: &str| ConnectError::InvalidChain {
        chain: chain.display_name(),
        reason: reason.into(),
    };

    if chain.name.trim().is_empty() {
        return Err(invalid("name is required"));
    }
    if chain.id.family() != chain.family() {
        return Err(invalid("id does not match connectivity family"));
    }

    match (&chain.id, &chain.connectivity) {
        (ChainId::Evm(id), Connectivity::Evm { rpc_urls }) => {
            if *id == 0 {
                return Err(invalid("evm chain id must be non-zero"));
            }
            if rpc_urls.is_empty() {
                return Err(invalid("at least one rpc url is required"));
            }
            if let Some(bad) = rpc_urls.iter().find(|u| !is_http_url(u)) {
                return Err(invalid(&format!("rpc url {bad} is not http(s)")));
            }
        }
        (ChainId::Solana(id), Connectivity::Solana { endpoint }) => {
            if id.trim().is_empty() {
                return Err(invalid("solana id is required"));
            }
            if !is_http_url(endpoint) {
                return Err(invalid("endpoint must be an http(s) url"));
            }
        }
        _ => return Err(invalid("id does not match connectivity family")),
    }

    Ok(())
}
