//! Multi-chain wallet connection core.
//!
//! Owns the connection state machine for EVM and Solana wallets: which
//! wallet is attached to which chain, switching between chains, and
//! reconciling changes the wallet extension makes on its own.

pub mod adapters;
pub mod config;
pub mod controller;
pub mod error;
pub mod metadata;
pub mod registry;
pub mod store;
pub mod wallets;

use std::sync::Arc;

use chain_eth::{EvmAdapter, EvmProvider};
use chain_sol::{SolanaAdapter, SolanaProvider};
use wallet_adapter::WalletAdapter;

pub use adapters::AdapterRegistry;
pub use config::{ConnectConfig, NetworkMode};
pub use controller::{ConnectionController, ConnectionPhase};
pub use error::{ConfigError, ConnectError};
pub use registry::ChainRegistry;
pub use store::{ConnectionState, ConnectionStore, ErrorInfo};
pub use wallets::{default_wallets, filter_wallets_by_chain};

pub use wallet_adapter::{
    AdapterError, Chain, ChainFamily, ChainId, Operation, Session, Wallet, WalletEvent,
};

/// Wire the EVM and Solana adapters to the chains described by `config`
/// behind a fresh store.
pub fn build_controller(
    config: &ConnectConfig,
    evm: Arc<dyn EvmProvider>,
    solana: Arc<dyn SolanaProvider>,
) -> Result<ConnectionController, ConfigError> {
    let chains = config.chain_registry()?;

    let mut evm_adapter = EvmAdapter::new(evm);
    if let Some(project_id) = &config.walletconnect_project_id {
        evm_adapter = evm_adapter.with_walletconnect_project_id(project_id.clone());
    }
    let adapters: [Arc<dyn WalletAdapter>; 2] =
        [Arc::new(evm_adapter), Arc::new(SolanaAdapter::new(solana))];

    let adapters = AdapterRegistry::new(chains.chains(), adapters)?;
    tracing::info!(
        network = %config.network,
        chains = chains.chains().len(),
        "connection controller ready"
    );

    Ok(ConnectionController::new(
        Arc::new(chains),
        adapters,
        Arc::new(ConnectionStore::new()),
    ))
}
