//! The observable connection state shared by the UI and the controller.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use wallet_adapter::{Chain, ChainFamily, Operation, Wallet};

/// Cloneable snapshot of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub operation: Operation,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(operation: Operation, err: &impl fmt::Display) -> Self {
        Self {
            operation,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

/// The single active (wallet, chain) pairing plus the flags the UI renders.
///
/// `is_connected` implies `wallet`, `chain` and `account` are all set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub wallet: Option<Wallet>,
    pub chain: Option<Chain>,
    pub account: Option<String>,
    pub is_connecting: bool,
    pub is_connected: bool,
    pub error: Option<ErrorInfo>,
    /// Target of a cross-family switch awaiting confirmation.
    pub pending_chain: Option<Chain>,
    /// Family the wallet-selection dialog is open for.
    pub dialog: Option<ChainFamily>,
}

/// Process-wide state holder. Owned and injected, never global.
///
/// Every setter commits and notifies subscribers inside the same call, so a
/// reader never observes a half-applied update.
#[derive(Debug)]
pub struct ConnectionStore {
    tx: watch::Sender<ConnectionState>,
}

impl Default for ConnectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ConnectionState::default());
        Self { tx }
    }

    /// Snapshot of the latest committed state.
    pub fn state(&self) -> ConnectionState {
        self.tx.borrow().clone()
    }

    /// Receiver that always observes the latest committed state.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.tx.subscribe()
    }

    /// Apply several field changes as one commit.
    pub fn update(&self, f: impl FnOnce(&mut ConnectionState)) {
        self.tx.send_modify(f);
    }

    pub fn set_wallet(&self, wallet: Option<Wallet>) {
        self.update(|s| s.wallet = wallet);
    }

    pub fn set_chain(&self, chain: Option<Chain>) {
        self.update(|s| s.chain = chain);
    }

    pub fn set_account(&self, account: Option<String>) {
        self.update(|s| s.account = account);
    }

    pub fn set_connecting(&self, connecting: bool) {
        self.update(|s| s.is_connecting = connecting);
    }

    pub fn set_connected(&self, connected: bool) {
        self.update(|s| s.is_connected = connected);
    }

    pub fn set_error(&self, error: Option<ErrorInfo>) {
        self.update(|s| s.error = error);
    }

    pub fn set_pending_chain(&self, chain: Option<Chain>) {
        self.update(|s| s.pending_chain = chain);
    }

    pub fn set_dialog(&self, family: Option<ChainFamily>) {
        self.update(|s| s.dialog = family);
    }

    pub fn reset(&self) {
        self.tx.send_replace(ConnectionState::default());
    }

    /// Atomically claim the single in-flight slot.
    ///
    /// Returns `false`, without notifying, when an operation already holds it.
    /// On success `is_connecting` is set and any previous error cleared.
    pub fn try_begin(&self) -> bool {
        self.tx.send_if_modified(|s| {
            if s.is_connecting {
                return false;
            }
            s.is_connecting = true;
            s.error = None;
            true
        })
    }
}
