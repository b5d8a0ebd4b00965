use async_trait::async_trait;
use wallet_adapter::ExtensionError;

/// The Solana wallet-extension integration the adapter drives.
///
/// A session is bound to one cluster endpoint; there is no network switch
/// primitive.
#[async_trait]
pub trait SolanaProvider: Send + Sync {
    /// Connect the named wallet against `endpoint`, returning its public key.
    async fn connect(&self, wallet_name: &str, endpoint: &str) -> Result<String, ExtensionError>;

    async fn disconnect(&self) -> Result<(), ExtensionError>;
}
