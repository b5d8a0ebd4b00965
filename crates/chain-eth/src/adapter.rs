use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use wallet_adapter::{
    ensure_compatible, ensure_family, AdapterError, Chain, ChainFamily, Operation, Session,
    SessionSlot, Wallet, WalletAdapter,
};

use crate::address::normalize_account;
use crate::error::EthError;
use crate::provider::{Connector, EvmProvider};

/// Wallet id served through the injected provider.
pub const INJECTED_WALLET_ID: &str = "metamask";

/// Adapter for EVM chains. Switching chains retargets the same session.
pub struct EvmAdapter {
    provider: Arc<dyn EvmProvider>,
    walletconnect_project_id: Option<String>,
    slot: SessionSlot,
}

impl EvmAdapter {
    pub fn new(provider: Arc<dyn EvmProvider>) -> Self {
        Self {
            provider,
            walletconnect_project_id: None,
            slot: SessionSlot::new(),
        }
    }

    pub fn with_walletconnect_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.walletconnect_project_id = Some(project_id.into());
        self
    }

    fn connector_for(&self, wallet: &Wallet) -> Result<Connector, EthError> {
        if wallet.id.eq_ignore_ascii_case(INJECTED_WALLET_ID) {
            return Ok(Connector::Injected);
        }
        match self.walletconnect_project_id.as_deref() {
            Some(id) if !id.trim().is_empty() => Ok(Connector::WalletConnect {
                project_id: id.to_string(),
            }),
            _ => Err(EthError::MissingProjectId),
        }
    }

    fn chain_id(chain: &Chain) -> Result<u64, AdapterError> {
        chain.evm_chain_id().ok_or_else(|| {
            AdapterError::ChainUnavailable(format!("{} has no evm chain id", chain.display_name()))
        })
    }

    /// Release a session that was opened but could not be completed.
    async fn release_partial(&self) {
        if let Err(e) = self.provider.disconnect().await {
            warn!(error = %e, "failed to release partially opened evm session");
        }
    }
}

#[async_trait]
impl WalletAdapter for EvmAdapter {
    fn family(&self) -> ChainFamily {
        ChainFamily::Evm
    }

    fn slot(&self) -> &SessionSlot {
        &self.slot
    }

    fn validate_account(&self, account: &str) -> Result<String, AdapterError> {
        Ok(normalize_account(account)?)
    }

    async fn connect(&self, wallet: &Wallet, chain: &Chain) -> Result<Session, AdapterError> {
        ensure_compatible(wallet, chain)?;
        ensure_family(ChainFamily::Evm, chain)?;
        let chain_id = Self::chain_id(chain)?;
        let connector = self.connector_for(wallet)?;

        debug!(wallet = %wallet.id, chain_id, ?connector, "connecting evm wallet");
        let account = self
            .provider
            .connect(&connector)
            .await
            .map_err(|e| AdapterError::external(Operation::Connect, e))?;

        let account = match self.validate_account(&account) {
            Ok(account) => account,
            Err(e) => {
                self.release_partial().await;
                return Err(e);
            }
        };

        if let Err(e) = self.provider.switch_network(chain_id).await {
            warn!(chain_id, error = %e, "connected but could not select chain");
            self.release_partial().await;
            return Err(AdapterError::ExternalConnectFailure(format!(
                "could not select chain {chain_id}: {e}"
            )));
        }

        let session = Session {
            wallet: wallet.clone(),
            chain: chain.clone(),
            account,
        };
        self.slot.replace(session.clone());
        info!(wallet = %wallet.id, chain_id, account = %session.account, "evm wallet connected");
        Ok(session)
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        let current = self.slot.require()?;

        self.provider
            .disconnect()
            .await
            .map_err(|e| AdapterError::external(Operation::Disconnect, e))?;

        self.slot.clear();
        info!(wallet = %current.wallet.id, "evm wallet disconnected");
        Ok(())
    }

    async fn switch_chain(&self, chain: &Chain) -> Result<Session, AdapterError> {
        let current = self.slot.require()?;
        ensure_family(ChainFamily::Evm, chain)?;
        ensure_compatible(&current.wallet, chain)?;
        let chain_id = Self::chain_id(chain)?;

        debug!(from = %current.chain.id, to = chain_id, "switching evm network");
        self.provider
            .switch_network(chain_id)
            .await
            .map_err(|e| AdapterError::external(Operation::SwitchChain, e))?;

        let session = Session {
            chain: chain.clone(),
            ..current
        };
        self.slot.replace(session.clone());
        info!(chain_id, "evm network switched");
        Ok(session)
    }
}
