use serde::Serialize;
use wallet_adapter::{Chain, NativeCurrency};

/// Static metadata for an EVM-compatible network.
#[derive(Debug, Clone, Serialize)]
pub struct EvmChain {
    pub chain_id: u64,
    pub name: &'static str,
    pub network: &'static str,
    pub currency_name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
    pub rpc_urls: &'static [&'static str],
    pub explorer_name: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

impl EvmChain {
    /// Registry form of this network.
    pub fn to_chain(&self) -> Chain {
        Chain::evm(
            self.chain_id,
            self.name,
            self.rpc_urls.iter().map(|u| u.to_string()).collect(),
            NativeCurrency::new(self.currency_name, self.symbol, self.decimals),
        )
        .with_network(self.network)
        .with_testnet(self.is_testnet)
        .with_explorer(self.explorer_name, self.explorer_url)
    }
}

/// Ethereum Mainnet (chain ID 1).
pub const ETHEREUM: EvmChain = EvmChain {
    chain_id: 1,
    name: "Ethereum",
    network: "homestead",
    currency_name: "Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_urls: &["https://eth.llamarpc.com", "https://cloudflare-eth.com"],
    explorer_name: "Etherscan",
    explorer_url: "https://etherscan.io",
    is_testnet: false,
};

/// Base (chain ID 8453).
pub const BASE: EvmChain = EvmChain {
    chain_id: 8453,
    name: "Base",
    network: "base",
    currency_name: "Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_urls: &["https://mainnet.base.org"],
    explorer_name: "Basescan",
    explorer_url: "https://basescan.org",
    is_testnet: false,
};

/// Sepolia Testnet (chain ID 11155111).
pub const SEPOLIA: EvmChain = EvmChain {
    chain_id: 11155111,
    name: "Sepolia",
    network: "sepolia",
    currency_name: "Sepolia Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_urls: &["https://ethereum-sepolia.publicnode.com", "https://rpc.sepolia.org"],
    explorer_name: "Etherscan",
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
};

/// Base Sepolia Testnet (chain ID 84532).
pub const BASE_SEPOLIA: EvmChain = EvmChain {
    chain_id: 84532,
    name: "Base Sepolia",
    network: "base-sepolia",
    currency_name: "Sepolia Ether",
    symbol: "ETH",
    decimals: 18,
    rpc_urls: &["https://sepolia.base.org"],
    explorer_name: "Basescan",
    explorer_url: "https://sepolia.basescan.org",
    is_testnet: true,
};
