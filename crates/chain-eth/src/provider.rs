use async_trait::async_trait;
use wallet_adapter::ExtensionError;

/// How the extension session is established.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connector {
    /// A browser-injected provider (MetaMask and friends).
    Injected,
    /// A WalletConnect relay session.
    WalletConnect { project_id: String },
}

/// The EVM wallet-extension integration the adapter drives.
///
/// Implementations wrap whatever host bridge is available; the adapter only
/// relies on these three primitives keyed by numeric chain id.
#[async_trait]
pub trait EvmProvider: Send + Sync {
    /// Open a session and return the first account address.
    async fn connect(&self, connector: &Connector) -> Result<String, ExtensionError>;

    async fn disconnect(&self) -> Result<(), ExtensionError>;

    /// Retarget the open session to another chain id.
    async fn switch_network(&self, chain_id: u64) -> Result<(), ExtensionError>;
}
