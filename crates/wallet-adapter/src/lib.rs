//! # wallet-adapter
//!
//! Chain-family agnostic building blocks shared by every wallet adapter:
//! the chain and wallet data model, the `WalletAdapter` capability trait,
//! adapter errors, and the events a wallet extension can push on its own.

pub mod adapter;
pub mod error;
pub mod event;
pub mod types;

pub use adapter::{ensure_compatible, ensure_family, SessionSlot, WalletAdapter};
pub use error::{AdapterError, ExtensionError, Operation};
pub use event::WalletEvent;
pub use types::{
    Chain, ChainFamily, ChainId, Connectivity, Explorer, NativeCurrency, Session, Wallet,
};
