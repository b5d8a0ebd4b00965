//! The capability interface every chain family implements.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::{Chain, ChainFamily, Session, Wallet};

/// Translates generic connect/disconnect/switch calls into the calls of one
/// chain family's wallet extension.
///
/// An adapter holds at most one [`Session`] at a time. Every mutation
/// replaces wallet, chain and account together through its [`SessionSlot`].
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// The chain family this adapter serves.
    fn family(&self) -> ChainFamily;

    /// Storage for the adapter's current session.
    fn slot(&self) -> &SessionSlot;

    /// Check and normalize an account address reported by the extension.
    fn validate_account(&self, account: &str) -> Result<String, AdapterError>;

    /// Attach `wallet` on `chain`. Fails with `IncompatibleWallet` before any
    /// extension call when the wallet does not support the chain's family.
    async fn connect(&self, wallet: &Wallet, chain: &Chain) -> Result<Session, AdapterError>;

    /// Release the current session. Fails with `NotConnected` when empty.
    async fn disconnect(&self) -> Result<(), AdapterError>;

    /// Move the current session to `chain` within this family.
    async fn switch_chain(&self, chain: &Chain) -> Result<Session, AdapterError>;

    fn session(&self) -> Option<Session> {
        self.slot().get()
    }

    fn is_connected(&self) -> bool {
        self.slot().get().is_some()
    }

    /// Drop the session without calling the extension, used when the
    /// extension itself reported the disconnect.
    fn detach(&self) -> Option<Session> {
        self.slot().clear()
    }

    /// Record a chain change the extension made on its own.
    fn adopt_chain(&self, chain: &Chain) -> Result<Session, AdapterError> {
        ensure_family(self.family(), chain)?;
        let current = self.slot().require()?;
        ensure_compatible(&current.wallet, chain)?;
        let next = Session {
            chain: chain.clone(),
            ..current
        };
        self.slot().replace(next.clone());
        Ok(next)
    }

    /// Record an account change the extension made on its own.
    fn adopt_account(&self, account: &str) -> Result<Session, AdapterError> {
        let current = self.slot().require()?;
        let account = self.validate_account(account)?;
        let next = Session { account, ..current };
        self.slot().replace(next.clone());
        Ok(next)
    }
}

/// Fail with `IncompatibleWallet` unless `wallet` supports `chain`'s family.
pub fn ensure_compatible(wallet: &Wallet, chain: &Chain) -> Result<(), AdapterError> {
    if wallet.is_compatible(chain) {
        Ok(())
    } else {
        Err(AdapterError::IncompatibleWallet {
            wallet: wallet.name.clone(),
            chain: chain.display_name(),
        })
    }
}

/// Fail with `ChainUnavailable` when `chain` belongs to another family.
pub fn ensure_family(family: ChainFamily, chain: &Chain) -> Result<(), AdapterError> {
    if chain.family() == family {
        Ok(())
    } else {
        Err(AdapterError::ChainUnavailable(format!(
            "{} is not on the {family} family",
            chain.display_name()
        )))
    }
}

/// The single (wallet, chain, account) slot owned by an adapter.
///
/// The lock is never held across an `.await`; callers take a snapshot,
/// talk to the extension, then commit a whole new session.
#[derive(Debug, Default)]
pub struct SessionSlot {
    inner: Mutex<Option<Session>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self) -> Option<Session> {
        self.lock().clone()
    }

    /// The current session, or `NotConnected`.
    pub fn require(&self) -> Result<Session, AdapterError> {
        self.get().ok_or(AdapterError::NotConnected)
    }

    /// Atomically replace the whole session, returning the previous one.
    pub fn replace(&self, session: Session) -> Option<Session> {
        self.lock().replace(session)
    }

    pub fn clear(&self) -> Option<Session> {
        self.lock().take()
    }
}
