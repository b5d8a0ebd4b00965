use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;
use wallet_adapter::{Chain, ChainFamily, WalletAdapter};

use crate::error::ConnectError;

/// Maps each chain family to the adapter that handles it.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<ChainFamily, Arc<dyn WalletAdapter>>,
}

impl AdapterRegistry {
    /// Register `adapters` for the families present in `chains`.
    ///
    /// An empty chain list is rejected. A later adapter for the same family
    /// replaces an earlier one.
    pub fn new(
        chains: &[Chain],
        adapters: impl IntoIterator<Item = Arc<dyn WalletAdapter>>,
    ) -> Result<Self, ConnectError> {
        if chains.is_empty() {
            return Err(ConnectError::NoChainsProvided);
        }

        let adapters: HashMap<_, _> = adapters.into_iter().map(|a| (a.family(), a)).collect();

        for chain in chains {
            if !adapters.contains_key(&chain.family()) {
                warn!(chain = %chain, "no adapter registered for chain family");
            }
        }

        Ok(Self { adapters })
    }

    pub fn get_adapter(&self, family: ChainFamily) -> Result<Arc<dyn WalletAdapter>, ConnectError> {
        self.adapters
            .get(&family)
            .cloned()
            .ok_or(ConnectError::UnsupportedFamily(family))
    }

    /// The adapter that handles `chain`.
    pub fn adapter_for(&self, chain: &Chain) -> Result<Arc<dyn WalletAdapter>, ConnectError> {
        self.get_adapter(chain.family())
    }

    pub fn families(&self) -> Vec<ChainFamily> {
        let mut families: Vec<_> = self.adapters.keys().copied().collect();
        families.sort();
        families
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("families", &self.families())
            .finish()
    }
}
