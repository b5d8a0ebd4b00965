use serde::Serialize;
use wallet_adapter::{Chain, NativeCurrency};

/// Static metadata for a Solana cluster.
#[derive(Debug, Clone, Serialize)]
pub struct SolanaCluster {
    pub id: &'static str,
    pub name: &'static str,
    pub network: &'static str,
    pub endpoint: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

impl SolanaCluster {
    /// Registry form of this cluster.
    pub fn to_chain(&self) -> Chain {
        Chain::solana(
            self.id,
            self.name,
            self.endpoint,
            NativeCurrency::new("Solana", "SOL", 9),
        )
        .with_network(self.network)
        .with_testnet(self.is_testnet)
        .with_explorer("Solana Explorer", self.explorer_url)
    }
}

pub const MAINNET_BETA: SolanaCluster = SolanaCluster {
    id: "mainnet",
    name: "Solana",
    network: "mainnet-beta",
    endpoint: "https://api.mainnet-beta.solana.com",
    explorer_url: "https://explorer.solana.com",
    is_testnet: false,
};

pub const DEVNET: SolanaCluster = SolanaCluster {
    id: "devnet",
    name: "Solana Devnet",
    network: "devnet",
    endpoint: "https://api.devnet.solana.com",
    explorer_url: "https://explorer.solana.com/?cluster=devnet",
    is_testnet: true,
};

pub const TESTNET: SolanaCluster = SolanaCluster {
    id: "testnet",
    name: "Solana Testnet",
    network: "testnet",
    endpoint: "https://api.testnet.solana.com",
    explorer_url: "https://explorer.solana.com/?cluster=testnet",
    is_testnet: true,
};
