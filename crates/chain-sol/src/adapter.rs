use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wallet_adapter::{
    ensure_compatible, ensure_family, AdapterError, Chain, ChainFamily, Operation, Session,
    SessionSlot, Wallet, WalletAdapter,
};

use crate::address::normalize_account;
use crate::provider::SolanaProvider;
use crate::switch::{ClusterSwitch, SwitchOutcome};

/// Adapter for Solana clusters.
pub struct SolanaAdapter {
    provider: Arc<dyn SolanaProvider>,
    slot: SessionSlot,
}

impl SolanaAdapter {
    pub fn new(provider: Arc<dyn SolanaProvider>) -> Self {
        Self {
            provider,
            slot: SessionSlot::new(),
        }
    }

    fn endpoint(chain: &Chain) -> Result<&str, AdapterError> {
        chain.rpc_url().ok_or_else(|| {
            AdapterError::ChainUnavailable(format!("{} has no endpoint", chain.display_name()))
        })
    }
}

#[async_trait]
impl WalletAdapter for SolanaAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Solana
    }

    fn slot(&self) -> &SessionSlot {
        &self.slot
    }

    fn validate_account(&self, account: &str) -> Result<String, AdapterError> {
        Ok(normalize_account(account)?)
    }

    async fn connect(&self, wallet: &Wallet, chain: &Chain) -> Result<Session, AdapterError> {
        ensure_compatible(wallet, chain)?;
        ensure_family(ChainFamily::Solana, chain)?;
        let endpoint = Self::endpoint(chain)?;

        debug!(wallet = %wallet.id, endpoint, "connecting solana wallet");
        let account = self
            .provider
            .connect(&wallet.name, endpoint)
            .await
            .map_err(|e| AdapterError::external(Operation::Connect, e))?;

        let account = match self.validate_account(&account) {
            Ok(account) => account,
            Err(e) => {
                if let Err(release) = self.provider.disconnect().await {
                    warn!(error = %release, "failed to release session with invalid account");
                }
                return Err(e);
            }
        };

        let session = Session {
            wallet: wallet.clone(),
            chain: chain.clone(),
            account,
        };
        self.slot.replace(session.clone());
        info!(wallet = %wallet.id, cluster = %chain.id, "solana wallet connected");
        Ok(session)
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        let current = self.slot.require()?;

        self.provider
            .disconnect()
            .await
            .map_err(|e| AdapterError::external(Operation::Disconnect, e))?;

        self.slot.clear();
        info!(wallet = %current.wallet.id, "solana wallet disconnected");
        Ok(())
    }

    async fn switch_chain(&self, chain: &Chain) -> Result<Session, AdapterError> {
        let current = self.slot.require()?;
        ensure_family(ChainFamily::Solana, chain)?;
        ensure_compatible(&current.wallet, chain)?;
        Self::endpoint(chain)?;

        match ClusterSwitch::new(self.provider.as_ref(), current, chain.clone())
            .run()
            .await
        {
            SwitchOutcome::Switched(session) => {
                self.slot.replace(session.clone());
                info!(cluster = %chain.id, "solana cluster switched");
                Ok(session)
            }
            SwitchOutcome::Aborted { cause } => Err(AdapterError::ExternalSwitchFailure(cause)),
            SwitchOutcome::RolledBack { restored, cause } => {
                self.slot.replace(restored);
                Err(AdapterError::ExternalSwitchFailure(format!(
                    "{cause}; restored previous cluster"
                )))
            }
            SwitchOutcome::Lost { cause, rollback } => {
                self.slot.clear();
                Err(AdapterError::ExternalSwitchFailure(format!(
                    "{cause}; rollback failed: {rollback}"
                )))
            }
        }
    }
}
