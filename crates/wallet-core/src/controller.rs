//! The connection state machine.
//!
//! Phases are derived from [`ConnectionState`], never stored. Every external
//! call runs under an in-flight claim on the store, so at most one
//! connect/disconnect/switch is outstanding at a time.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use wallet_adapter::{
    AdapterError, Chain, ChainFamily, ChainId, Operation, Session, Wallet, WalletAdapter,
    WalletEvent,
};

use crate::adapters::AdapterRegistry;
use crate::error::ConnectError;
use crate::registry::ChainRegistry;
use crate::store::{ConnectionState, ConnectionStore, ErrorInfo};
use crate::wallets::{default_wallets, filter_wallets_by_chain};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPhase {
    Idle,
    AwaitingWalletSelection,
    AwaitingSwitchConfirmation,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionPhase::Idle => "idle",
            ConnectionPhase::AwaitingWalletSelection => "awaiting wallet selection",
            ConnectionPhase::AwaitingSwitchConfirmation => "awaiting switch confirmation",
            ConnectionPhase::Connecting => "connecting",
            ConnectionPhase::Connected => "connected",
            ConnectionPhase::Error => "error",
        };
        f.write_str(s)
    }
}

impl ConnectionState {
    /// Derive the phase. Earlier checks win when several flags are set.
    pub fn phase(&self) -> ConnectionPhase {
        if self.is_connecting {
            ConnectionPhase::Connecting
        } else if self.pending_chain.is_some() {
            ConnectionPhase::AwaitingSwitchConfirmation
        } else if self.is_connected {
            ConnectionPhase::Connected
        } else if self.error.is_some() {
            ConnectionPhase::Error
        } else if self.dialog.is_some() {
            ConnectionPhase::AwaitingWalletSelection
        } else {
            ConnectionPhase::Idle
        }
    }

    /// True when a session on `family` is live.
    fn connected_on(&self, family: ChainFamily) -> bool {
        self.is_connected && self.chain.as_ref().is_some_and(|c| c.family() == family)
    }
}

/// Exclusive claim on the store's in-flight slot.
///
/// `finish` clears `is_connecting` in the same commit as the outcome. A claim
/// dropped without finishing (cancelled future) still releases the slot.
struct InFlight<'a> {
    store: &'a ConnectionStore,
    finished: bool,
}

impl<'a> InFlight<'a> {
    fn begin(store: &'a ConnectionStore) -> Result<Self, ConnectError> {
        if store.try_begin() {
            Ok(Self {
                store,
                finished: false,
            })
        } else {
            Err(ConnectError::OperationInProgress)
        }
    }

    fn finish(mut self, f: impl FnOnce(&mut ConnectionState)) {
        self.finished = true;
        self.store.update(|s| {
            s.is_connecting = false;
            f(s);
        });
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.store.set_connecting(false);
        }
    }
}

/// Drives connect, disconnect and chain switching across chain families and
/// commits every outcome to the [`ConnectionStore`].
pub struct ConnectionController {
    chains: Arc<ChainRegistry>,
    adapters: AdapterRegistry,
    store: Arc<ConnectionStore>,
    wallets: Vec<Wallet>,
}

impl ConnectionController {
    pub fn new(
        chains: Arc<ChainRegistry>,
        adapters: AdapterRegistry,
        store: Arc<ConnectionStore>,
    ) -> Self {
        Self {
            chains,
            adapters,
            store,
            wallets: default_wallets(),
        }
    }

    /// Replace the wallet catalogue offered by [`Self::available_wallets`].
    pub fn with_wallets(mut self, wallets: Vec<Wallet>) -> Self {
        self.wallets = wallets;
        self
    }

    pub fn chains(&self) -> &ChainRegistry {
        &self.chains
    }

    pub fn store(&self) -> &Arc<ConnectionStore> {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.store.subscribe()
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.store.state().phase()
    }

    /// Wallets the open dialog should list, filtered by the selected chain.
    pub fn available_wallets(&self) -> Vec<Wallet> {
        match self.store.state().chain {
            Some(chain) => filter_wallets_by_chain(&self.wallets, &chain)
                .into_iter()
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    fn reject(&self, operation: &'static str, state: &ConnectionState) -> ConnectError {
        let phase = state.phase();
        warn!(operation, %phase, "operation rejected");
        if phase == ConnectionPhase::Connecting {
            ConnectError::OperationInProgress
        } else {
            ConnectError::InvalidState { operation, phase }
        }
    }

    /// Open wallet selection for `family`. A no-op while connected.
    pub fn request_connect(&self, family: ChainFamily) -> Result<(), ConnectError> {
        let state = self.store.state();
        if state.is_connecting {
            return Err(self.reject("request_connect", &state));
        }
        if state.is_connected {
            debug!(%family, "already connected, ignoring connect request");
            return Ok(());
        }

        self.adapters.get_adapter(family)?;
        let chain = match state.chain {
            Some(chain) if chain.family() == family => chain,
            _ => self
                .chains
                .default_chain(family)
                .cloned()
                .ok_or(ConnectError::UnsupportedFamily(family))?,
        };

        debug!(%family, chain = %chain, "awaiting wallet selection");
        self.store.update(|s| {
            s.dialog = Some(family);
            s.chain = Some(chain);
            s.error = None;
        });
        Ok(())
    }

    /// Connect `wallet` on the chain chosen for the open dialog.
    pub async fn select_wallet(&self, wallet: &Wallet) -> Result<Session, ConnectError> {
        let state = self.store.state();
        let family = match state.dialog {
            Some(family) if !state.is_connected && !state.is_connecting => family,
            _ => return Err(self.reject("select_wallet", &state)),
        };

        let chain = match state.chain {
            Some(chain) if chain.family() == family => chain,
            _ => self
                .chains
                .default_chain(family)
                .cloned()
                .ok_or(ConnectError::UnsupportedFamily(family))?,
        };
        let adapter = self.adapters.adapter_for(&chain)?;

        let op = InFlight::begin(&self.store)?;
        debug!(wallet = %wallet.id, chain = %chain, "connecting");

        match adapter.connect(wallet, &chain).await {
            Ok(session) => {
                info!(wallet = %session.wallet.id, chain = %session.chain, "wallet connected");
                let committed = session.clone();
                op.finish(move |s| {
                    s.wallet = Some(committed.wallet);
                    s.chain = Some(committed.chain);
                    s.account = Some(committed.account);
                    s.is_connected = true;
                    s.error = None;
                    s.pending_chain = None;
                    s.dialog = None;
                });
                Ok(session)
            }
            Err(e) => {
                warn!(wallet = %wallet.id, chain = %chain, error = %e, "connect failed");
                op.finish(|s| s.error = Some(ErrorInfo::new(Operation::Connect, &e)));
                Err(e.into())
            }
        }
    }

    /// Switch to `chain`.
    ///
    /// Within the connected family the adapter retargets the live session.
    /// Across families the chain is only parked as pending until
    /// [`Self::confirm_switch`]. While disconnected only the selected chain
    /// changes.
    pub async fn request_switch_chain(&self, chain: &Chain) -> Result<(), ConnectError> {
        let state = self.store.state();
        if state.is_connecting {
            return Err(self.reject("request_switch_chain", &state));
        }

        let target = self
            .chains
            .find_chain(&chain.id)
            .cloned()
            .ok_or_else(|| ConnectError::UnknownChain(chain.id.clone()))?;

        if state.chain.as_ref().is_some_and(|c| c.id == target.id) {
            if state.pending_chain.is_some() {
                self.store.set_pending_chain(None);
            }
            return Ok(());
        }

        let current = match state.chain {
            Some(current) if state.is_connected => current,
            _ => {
                debug!(chain = %target, "selecting chain while disconnected");
                self.store.update(|s| {
                    if s.dialog.is_some() {
                        s.dialog = Some(target.family());
                    }
                    s.chain = Some(target);
                });
                return Ok(());
            }
        };

        if current.family() != target.family() {
            debug!(from = %current, to = %target, "cross-family switch awaits confirmation");
            self.store.set_pending_chain(Some(target));
            return Ok(());
        }

        let adapter = self.adapters.adapter_for(&target)?;
        let op = InFlight::begin(&self.store)?;
        debug!(from = %current, to = %target, "switching chain");

        match adapter.switch_chain(&target).await {
            Ok(session) => {
                info!(chain = %session.chain, "chain switched");
                op.finish(move |s| {
                    s.wallet = Some(session.wallet);
                    s.chain = Some(session.chain);
                    s.account = Some(session.account);
                    s.pending_chain = None;
                });
                Ok(())
            }
            Err(e) => {
                let error = ErrorInfo::new(Operation::SwitchChain, &e);
                if let Some(session) = adapter.session() {
                    // A rolled-back switch may come back with a different account.
                    warn!(to = %target, error = %e, "chain switch failed");
                    op.finish(move |s| {
                        s.wallet = Some(session.wallet);
                        s.chain = Some(session.chain);
                        s.account = Some(session.account);
                        s.error = Some(error);
                        s.pending_chain = None;
                    });
                } else {
                    warn!(to = %target, error = %e, "chain switch lost the session");
                    op.finish(|s| {
                        *s = ConnectionState {
                            error: Some(error),
                            ..ConnectionState::default()
                        }
                    });
                }
                Err(e.into())
            }
        }
    }

    /// Tear down the current session and open wallet selection for the
    /// pending chain's family.
    pub async fn confirm_switch(&self) -> Result<(), ConnectError> {
        let state = self.store.state();
        let (current, pending) = match (&state.chain, &state.pending_chain) {
            (Some(current), Some(pending)) if !state.is_connecting => {
                (current.clone(), pending.clone())
            }
            _ => return Err(self.reject("confirm_switch", &state)),
        };

        let adapter = self.adapters.adapter_for(&current)?;
        let op = InFlight::begin(&self.store)?;
        debug!(from = %current, to = %pending, "confirming cross-family switch");

        match release(adapter.as_ref()).await {
            Ok(()) => {
                info!(from = %current, to = %pending, "session released for cross-family switch");
                op.finish(move |s| {
                    *s = ConnectionState {
                        dialog: Some(pending.family()),
                        chain: Some(pending),
                        ..ConnectionState::default()
                    }
                });
                Ok(())
            }
            Err(e) => {
                warn!(chain = %current, error = %e, "disconnect failed, switch aborted");
                op.finish(|s| {
                    s.pending_chain = None;
                    s.error = Some(ErrorInfo::new(Operation::Disconnect, &e));
                });
                Err(e.into())
            }
        }
    }

    /// Drop the pending cross-family switch. No external calls are made.
    pub fn cancel_switch(&self) {
        if self.store.state().pending_chain.is_some() {
            debug!("cross-family switch cancelled");
            self.store.set_pending_chain(None);
        }
    }

    /// Close the wallet-selection dialog and forget any pending switch.
    ///
    /// An external call already in flight is not aborted; its outcome is
    /// still committed when it resolves.
    pub fn close_dialog(&self) {
        self.store.update(|s| {
            s.dialog = None;
            s.pending_chain = None;
        });
    }

    /// Release the connected wallet and reset the store.
    ///
    /// On failure the wallet and chain stay in place with the error recorded.
    pub async fn disconnect(&self) -> Result<(), ConnectError> {
        let state = self.store.state();
        if state.is_connecting {
            return Err(self.reject("disconnect", &state));
        }

        let chain = match state.chain {
            Some(chain) if state.is_connected => chain,
            _ if state.error.is_some() => {
                debug!("clearing failed attempt");
                self.store.reset();
                return Ok(());
            }
            _ => return Err(AdapterError::NotConnected.into()),
        };

        let adapter = self.adapters.adapter_for(&chain)?;
        let op = InFlight::begin(&self.store)?;

        match release(adapter.as_ref()).await {
            Ok(()) => {
                info!(chain = %chain, "wallet disconnected");
                op.finish(|s| *s = ConnectionState::default());
                Ok(())
            }
            Err(e) => {
                warn!(chain = %chain, error = %e, "disconnect failed");
                op.finish(|s| s.error = Some(ErrorInfo::new(Operation::Disconnect, &e)));
                Err(e.into())
            }
        }
    }

    /// Reconcile a change the wallet extension made on its own.
    pub fn handle_event(&self, event: WalletEvent) -> Result<(), ConnectError> {
        debug!(?event, "wallet event");
        let adapter = self.adapters.get_adapter(event.family())?;
        let state = self.store.state();

        match event {
            WalletEvent::Disconnected { family } => {
                adapter.detach();
                if state.connected_on(family) {
                    info!(%family, "wallet disconnected by extension");
                    self.store.update(|s| {
                        *s = ConnectionState {
                            is_connecting: s.is_connecting,
                            ..ConnectionState::default()
                        }
                    });
                }
                Ok(())
            }
            WalletEvent::AccountChanged { family, account } => {
                if !state.connected_on(family) {
                    return Ok(());
                }
                match adapter.adopt_account(&account) {
                    Ok(session) => {
                        info!(%family, account = %session.account, "account changed");
                        self.store.set_account(Some(session.account));
                        Ok(())
                    }
                    Err(e) => Err(self.record(Operation::Connect, e)),
                }
            }
            WalletEvent::NetworkChanged { chain_id } => {
                if !state.connected_on(ChainFamily::Evm) {
                    return Ok(());
                }
                let id = ChainId::Evm(chain_id);
                if state.chain.as_ref().is_some_and(|c| c.id == id) {
                    return Ok(());
                }
                let Some(chain) = self.chains.find_chain(&id) else {
                    let e = AdapterError::ChainUnavailable(format!("chain {id} is not configured"));
                    return Err(self.record(Operation::SwitchChain, e));
                };
                match adapter.adopt_chain(chain) {
                    Ok(session) => {
                        info!(chain = %session.chain, "network changed by extension");
                        self.store.set_chain(Some(session.chain));
                        Ok(())
                    }
                    Err(e) => Err(self.record(Operation::SwitchChain, e)),
                }
            }
        }
    }

    fn record(&self, operation: Operation, e: AdapterError) -> ConnectError {
        warn!(%operation, error = %e, "wallet event rejected");
        self.store.set_error(Some(ErrorInfo::new(operation, &e)));
        e.into()
    }

    /// Apply events from `rx` until every sender is dropped.
    pub async fn pump_events(&self, mut rx: mpsc::Receiver<WalletEvent>) {
        while let Some(event) = rx.recv().await {
            // Already recorded in the store.
            let _ = self.handle_event(event);
        }
        debug!("wallet event stream closed");
    }
}

/// Disconnect `adapter`. An adapter that already lost its session counts as
/// released.
async fn release(adapter: &dyn WalletAdapter) -> Result<(), AdapterError> {
    match adapter.disconnect().await {
        Err(AdapterError::NotConnected) => {
            warn!(family = %adapter.family(), "adapter held no session");
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use wallet_adapter::{ensure_compatible, ensure_family, SessionSlot};

    struct FakeAdapter {
        family: ChainFamily,
        slot: SessionSlot,
        connects: AtomicUsize,
        disconnects: AtomicUsize,
        switches: AtomicUsize,
        fail_connect: AtomicBool,
        fail_disconnect: AtomicBool,
        fail_switch: AtomicBool,
        gate: Option<Arc<Notify>>,
    }

    impl FakeAdapter {
        fn new(family: ChainFamily) -> Self {
            Self {
                family,
                slot: SessionSlot::new(),
                connects: AtomicUsize::new(0),
                disconnects: AtomicUsize::new(0),
                switches: AtomicUsize::new(0),
                fail_connect: AtomicBool::new(false),
                fail_disconnect: AtomicBool::new(false),
                fail_switch: AtomicBool::new(false),
                gate: None,
            }
        }

        fn gated(family: ChainFamily, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(family)
            }
        }
    }

    #[async_trait]
    impl WalletAdapter for FakeAdapter {
        fn family(&self) -> ChainFamily {
            self.family
        }

        fn slot(&self) -> &SessionSlot {
            &self.slot
        }

        fn validate_account(&self, account: &str) -> Result<String, AdapterError> {
            if account.is_empty() {
                Err(AdapterError::ExternalConnectFailure("empty account".into()))
            } else {
                Ok(account.to_string())
            }
        }

        async fn connect(&self, wallet: &Wallet, chain: &Chain) -> Result<Session, AdapterError> {
            ensure_compatible(wallet, chain)?;
            self.connects.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_connect.load(Ordering::SeqCst) {
                return Err(AdapterError::ExternalConnectFailure("user rejected".into()));
            }
            let session = Session {
                wallet: wallet.clone(),
                chain: chain.clone(),
                account: format!("{}-account", wallet.id),
            };
            self.slot.replace(session.clone());
            Ok(session)
        }

        async fn disconnect(&self) -> Result<(), AdapterError> {
            self.slot.require()?;
            self.disconnects.fetch_add(1, Ordering::SeqCst);
            if self.fail_disconnect.load(Ordering::SeqCst) {
                return Err(AdapterError::ExternalDisconnectFailure("locked".into()));
            }
            self.slot.clear();
            Ok(())
        }

        async fn switch_chain(&self, chain: &Chain) -> Result<Session, AdapterError> {
            ensure_family(self.family, chain)?;
            let current = self.slot.require()?;
            self.switches.fetch_add(1, Ordering::SeqCst);
            if self.fail_switch.load(Ordering::SeqCst) {
                return Err(AdapterError::ExternalSwitchFailure("rejected".into()));
            }
            let next = Session {
                chain: chain.clone(),
                ..current
            };
            self.slot.replace(next.clone());
            Ok(next)
        }
    }

    struct Harness {
        controller: ConnectionController,
        evm: Arc<FakeAdapter>,
        sol: Arc<FakeAdapter>,
    }

    fn harness_with(evm: FakeAdapter) -> Harness {
        let chains = Arc::new(ChainRegistry::mainnet());
        let evm = Arc::new(evm);
        let sol = Arc::new(FakeAdapter::new(ChainFamily::Solana));
        let adapters = AdapterRegistry::new(
            chains.chains(),
            [
                evm.clone() as Arc<dyn WalletAdapter>,
                sol.clone() as Arc<dyn WalletAdapter>,
            ],
        )
        .unwrap();
        let controller =
            ConnectionController::new(chains, adapters, Arc::new(ConnectionStore::new()));
        Harness {
            controller,
            evm,
            sol,
        }
    }

    fn harness() -> Harness {
        harness_with(FakeAdapter::new(ChainFamily::Evm))
    }

    fn wallet(id: &str) -> Wallet {
        default_wallets().into_iter().find(|w| w.id == id).unwrap()
    }

    fn chain(h: &Harness, id: impl Into<ChainId>) -> Chain {
        h.controller.chains().find_chain(&id.into()).unwrap().clone()
    }

    async fn connect_metamask(h: &Harness) {
        h.controller.request_connect(ChainFamily::Evm).unwrap();
        h.controller.select_wallet(&wallet("metamask")).await.unwrap();
    }

    #[test]
    fn phase_precedence() {
        let mut state = ConnectionState {
            dialog: Some(ChainFamily::Evm),
            ..Default::default()
        };
        assert_eq!(state.phase(), ConnectionPhase::AwaitingWalletSelection);

        state.error = Some(ErrorInfo::new(Operation::Connect, &"x"));
        assert_eq!(state.phase(), ConnectionPhase::Error);

        state.is_connected = true;
        assert_eq!(state.phase(), ConnectionPhase::Connected);

        state.pending_chain = Some(ChainRegistry::mainnet().chains()[2].clone());
        assert_eq!(state.phase(), ConnectionPhase::AwaitingSwitchConfirmation);

        state.is_connecting = true;
        assert_eq!(state.phase(), ConnectionPhase::Connecting);

        assert_eq!(ConnectionState::default().phase(), ConnectionPhase::Idle);
    }

    #[test]
    fn request_connect_opens_dialog_on_default_chain() {
        let h = harness();
        h.controller.request_connect(ChainFamily::Solana).unwrap();

        let state = h.controller.state();
        assert_eq!(h.controller.phase(), ConnectionPhase::AwaitingWalletSelection);
        assert_eq!(state.dialog, Some(ChainFamily::Solana));
        assert_eq!(state.chain.unwrap().id, ChainId::Solana("mainnet".into()));

        let ids: Vec<_> = h.controller.available_wallets().into_iter().map(|w| w.id).collect();
        assert_eq!(ids, vec!["phantom", "solflare"]);
    }

    #[tokio::test]
    async fn request_connect_keeps_selected_chain_of_same_family() {
        let h = harness();
        let base = chain(&h, 8453u64);
        h.controller.request_switch_chain(&base).await.unwrap();
        h.controller.request_connect(ChainFamily::Evm).unwrap();
        assert_eq!(h.controller.state().chain, Some(base));
    }

    #[tokio::test]
    async fn request_connect_while_connected_is_noop() {
        let h = harness();
        connect_metamask(&h).await;
        let before = h.controller.state();

        h.controller.request_connect(ChainFamily::Solana).unwrap();
        assert_eq!(h.controller.state(), before);
    }

    #[tokio::test]
    async fn select_wallet_connects() {
        let h = harness();
        connect_metamask(&h).await;

        let state = h.controller.state();
        assert_eq!(h.controller.phase(), ConnectionPhase::Connected);
        assert_eq!(state.wallet.unwrap().id, "metamask");
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(1));
        assert_eq!(state.account.as_deref(), Some("metamask-account"));
        assert!(state.dialog.is_none());
        assert!(!state.is_connecting);
    }

    #[tokio::test]
    async fn select_wallet_requires_open_dialog() {
        let h = harness();
        let err = h.controller.select_wallet(&wallet("metamask")).await.unwrap_err();
        assert_eq!(
            err,
            ConnectError::InvalidState {
                operation: "select_wallet",
                phase: ConnectionPhase::Idle,
            }
        );
        assert_eq!(h.evm.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn incompatible_wallet_never_reaches_extension() {
        let h = harness();
        h.controller.request_connect(ChainFamily::Evm).unwrap();

        let err = h.controller.select_wallet(&wallet("phantom")).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectError::Adapter(AdapterError::IncompatibleWallet { .. })
        ));
        assert_eq!(h.evm.connects.load(Ordering::SeqCst), 0);

        let state = h.controller.state();
        assert_eq!(state.error.unwrap().operation, Operation::Connect);
        assert!(!state.is_connecting);
    }

    #[tokio::test]
    async fn failed_connect_can_be_retried() {
        let h = harness();
        h.evm.fail_connect.store(true, Ordering::SeqCst);
        h.controller.request_connect(ChainFamily::Evm).unwrap();

        let err = h.controller.select_wallet(&wallet("metamask")).await.unwrap_err();
        assert_eq!(err.to_string(), "connect failed: user rejected");
        assert_eq!(h.controller.phase(), ConnectionPhase::Error);
        assert_eq!(
            h.controller.state().error.unwrap().message,
            "connect failed: user rejected"
        );

        h.evm.fail_connect.store(false, Ordering::SeqCst);
        h.controller.select_wallet(&wallet("metamask")).await.unwrap();
        assert_eq!(h.controller.phase(), ConnectionPhase::Connected);
        assert!(h.controller.state().error.is_none());
    }

    #[tokio::test]
    async fn same_family_switch_is_direct() {
        let h = harness();
        connect_metamask(&h).await;

        h.controller.request_switch_chain(&chain(&h, 8453u64)).await.unwrap();

        let state = h.controller.state();
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(8453));
        assert!(state.pending_chain.is_none());
        assert!(state.is_connected);
        assert_eq!(h.evm.switches.load(Ordering::SeqCst), 1);
        assert_eq!(h.evm.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_same_family_switch_keeps_chain() {
        let h = harness();
        connect_metamask(&h).await;
        h.evm.fail_switch.store(true, Ordering::SeqCst);

        let err = h
            .controller
            .request_switch_chain(&chain(&h, 8453u64))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "switch chain failed: rejected");

        let state = h.controller.state();
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(1));
        assert!(state.is_connected);
        assert_eq!(state.error.unwrap().operation, Operation::SwitchChain);
        assert_eq!(h.controller.phase(), ConnectionPhase::Connected);
    }

    #[tokio::test]
    async fn switch_to_current_chain_is_noop() {
        let h = harness();
        connect_metamask(&h).await;
        h.controller.request_switch_chain(&chain(&h, 1u64)).await.unwrap();
        assert_eq!(h.evm.switches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn switch_to_unknown_chain_fails() {
        let h = harness();
        let polygon = Chain::evm(
            137,
            "Polygon",
            vec!["https://polygon-rpc.com".into()],
            wallet_adapter::NativeCurrency::new("MATIC", "MATIC", 18),
        );
        let err = h.controller.request_switch_chain(&polygon).await.unwrap_err();
        assert_eq!(err, ConnectError::UnknownChain(ChainId::Evm(137)));
        assert_eq!(h.controller.state(), ConnectionState::default());
    }

    #[tokio::test]
    async fn switch_while_disconnected_only_updates_chain() {
        let h = harness();
        h.controller.request_connect(ChainFamily::Evm).unwrap();

        h.controller.request_switch_chain(&chain(&h, "mainnet")).await.unwrap();

        let state = h.controller.state();
        assert_eq!(state.chain.unwrap().id, ChainId::Solana("mainnet".into()));
        assert_eq!(state.dialog, Some(ChainFamily::Solana));
        assert!(state.pending_chain.is_none());
        assert_eq!(h.evm.switches.load(Ordering::SeqCst), 0);
        assert_eq!(h.sol.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cross_family_switch_waits_for_confirmation() {
        let h = harness();
        connect_metamask(&h).await;
        let solana = chain(&h, "mainnet");

        h.controller.request_switch_chain(&solana).await.unwrap();
        let state = h.controller.state();
        assert_eq!(h.controller.phase(), ConnectionPhase::AwaitingSwitchConfirmation);
        assert_eq!(state.pending_chain, Some(solana.clone()));
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(1));
        assert!(state.is_connected);
        assert_eq!(h.evm.disconnects.load(Ordering::SeqCst), 0);

        h.controller.confirm_switch().await.unwrap();
        let state = h.controller.state();
        assert_eq!(h.controller.phase(), ConnectionPhase::AwaitingWalletSelection);
        assert_eq!(state.chain, Some(solana));
        assert_eq!(state.dialog, Some(ChainFamily::Solana));
        assert!(state.pending_chain.is_none());
        assert!(!state.is_connected);
        assert_eq!(h.evm.disconnects.load(Ordering::SeqCst), 1);

        h.controller.select_wallet(&wallet("phantom")).await.unwrap();
        let state = h.controller.state();
        assert_eq!(state.wallet.unwrap().id, "phantom");
        assert_eq!(state.chain.unwrap().id, ChainId::Solana("mainnet".into()));
        assert!(state.is_connected);
    }

    #[tokio::test]
    async fn cancel_switch_restores_connected() {
        let h = harness();
        connect_metamask(&h).await;
        let before = h.controller.state();

        h.controller.request_switch_chain(&chain(&h, "mainnet")).await.unwrap();
        h.controller.cancel_switch();
        h.controller.cancel_switch();

        assert_eq!(h.controller.state(), before);
        assert_eq!(h.controller.phase(), ConnectionPhase::Connected);
    }

    #[tokio::test]
    async fn failed_confirm_keeps_original_chain() {
        let h = harness();
        connect_metamask(&h).await;
        h.controller.request_switch_chain(&chain(&h, "mainnet")).await.unwrap();
        h.evm.fail_disconnect.store(true, Ordering::SeqCst);

        let err = h.controller.confirm_switch().await.unwrap_err();
        assert_eq!(err.to_string(), "disconnect failed: locked");

        let state = h.controller.state();
        assert!(state.is_connected);
        assert!(state.pending_chain.is_none());
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(1));
        assert_eq!(state.error.unwrap().operation, Operation::Disconnect);
    }

    #[tokio::test]
    async fn confirm_without_pending_chain_is_invalid() {
        let h = harness();
        connect_metamask(&h).await;
        let err = h.controller.confirm_switch().await.unwrap_err();
        assert_eq!(
            err,
            ConnectError::InvalidState {
                operation: "confirm_switch",
                phase: ConnectionPhase::Connected,
            }
        );
    }

    #[tokio::test]
    async fn disconnect_resets_store() {
        let h = harness();
        connect_metamask(&h).await;

        h.controller.disconnect().await.unwrap();
        assert_eq!(h.controller.state(), ConnectionState::default());
        assert!(!h.evm.is_connected());
    }

    #[tokio::test]
    async fn second_disconnect_is_not_connected() {
        let h = harness();
        connect_metamask(&h).await;
        h.controller.disconnect().await.unwrap();

        let before = h.controller.state();
        let err = h.controller.disconnect().await.unwrap_err();
        assert_eq!(err, ConnectError::Adapter(AdapterError::NotConnected));
        assert_eq!(h.controller.state(), before);
        assert_eq!(h.evm.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_disconnect_keeps_session() {
        let h = harness();
        connect_metamask(&h).await;
        h.evm.fail_disconnect.store(true, Ordering::SeqCst);

        assert!(h.controller.disconnect().await.is_err());
        let state = h.controller.state();
        assert!(state.is_connected);
        assert_eq!(state.wallet.unwrap().id, "metamask");
        assert_eq!(state.error.unwrap().message, "disconnect failed: locked");
    }

    #[tokio::test]
    async fn disconnect_clears_failed_attempt() {
        let h = harness();
        h.evm.fail_connect.store(true, Ordering::SeqCst);
        h.controller.request_connect(ChainFamily::Evm).unwrap();
        let _ = h.controller.select_wallet(&wallet("metamask")).await;
        assert_eq!(h.controller.phase(), ConnectionPhase::Error);

        h.controller.disconnect().await.unwrap();
        assert_eq!(h.controller.phase(), ConnectionPhase::Idle);
    }

    #[tokio::test]
    async fn operations_are_serialized() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FakeAdapter::gated(ChainFamily::Evm, gate.clone()));
        h.controller.request_connect(ChainFamily::Evm).unwrap();
        let metamask = wallet("metamask");

        let (connected, rejected) = tokio::join!(h.controller.select_wallet(&metamask), async {
            tokio::task::yield_now().await;
            let before = h.controller.state();
            let result = h.controller.disconnect().await;
            assert_eq!(h.controller.state(), before);
            assert!(before.is_connecting);
            gate.notify_one();
            result
        });

        assert!(connected.is_ok());
        assert_eq!(rejected.unwrap_err(), ConnectError::OperationInProgress);
        assert!(h.controller.state().is_connected);
    }

    #[tokio::test]
    async fn close_dialog_does_not_abort_in_flight_connect() {
        let gate = Arc::new(Notify::new());
        let h = harness_with(FakeAdapter::gated(ChainFamily::Evm, gate.clone()));
        h.controller.request_connect(ChainFamily::Evm).unwrap();
        let metamask = wallet("metamask");

        let (connected, ()) = tokio::join!(h.controller.select_wallet(&metamask), async {
            tokio::task::yield_now().await;
            h.controller.close_dialog();
            assert!(h.controller.state().dialog.is_none());
            gate.notify_one();
        });

        assert!(connected.is_ok());
        assert!(h.controller.state().is_connected);
    }

    #[tokio::test]
    async fn extension_disconnect_resets_store() {
        let h = harness();
        connect_metamask(&h).await;

        h.controller
            .handle_event(WalletEvent::Disconnected {
                family: ChainFamily::Evm,
            })
            .unwrap();

        assert_eq!(h.controller.state(), ConnectionState::default());
        assert!(!h.evm.is_connected());
        assert_eq!(h.evm.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extension_disconnect_on_other_family_is_ignored() {
        let h = harness();
        connect_metamask(&h).await;
        let before = h.controller.state();

        h.controller
            .handle_event(WalletEvent::Disconnected {
                family: ChainFamily::Solana,
            })
            .unwrap();
        assert_eq!(h.controller.state(), before);
    }

    #[tokio::test]
    async fn account_change_updates_store() {
        let h = harness();
        connect_metamask(&h).await;

        h.controller
            .handle_event(WalletEvent::AccountChanged {
                family: ChainFamily::Evm,
                account: "other".into(),
            })
            .unwrap();
        assert_eq!(h.controller.state().account.as_deref(), Some("other"));
        assert_eq!(h.evm.session().unwrap().account, "other");
    }

    #[tokio::test]
    async fn network_change_adopts_known_chain() {
        let h = harness();
        connect_metamask(&h).await;

        h.controller
            .handle_event(WalletEvent::NetworkChanged { chain_id: 8453 })
            .unwrap();
        assert_eq!(h.controller.state().chain.unwrap().id, ChainId::Evm(8453));
        assert_eq!(h.evm.switches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn network_change_to_unknown_chain_records_error() {
        let h = harness();
        connect_metamask(&h).await;

        let err = h
            .controller
            .handle_event(WalletEvent::NetworkChanged { chain_id: 137 })
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "chain unavailable: chain 137 is not configured"
        );
        let state = h.controller.state();
        assert_eq!(state.chain.unwrap().id, ChainId::Evm(1));
        assert_eq!(state.error.unwrap().operation, Operation::SwitchChain);
    }

    #[tokio::test]
    async fn pump_events_drains_channel() {
        let h = harness();
        connect_metamask(&h).await;

        let (tx, rx) = mpsc::channel(4);
        tx.send(WalletEvent::NetworkChanged { chain_id: 8453 }).await.unwrap();
        tx.send(WalletEvent::Disconnected {
            family: ChainFamily::Evm,
        })
        .await
        .unwrap();
        drop(tx);

        h.controller.pump_events(rx).await;
        assert_eq!(h.controller.state(), ConnectionState::default());
    }
}
