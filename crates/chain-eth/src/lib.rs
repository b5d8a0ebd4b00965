//! EVM chain family support for the wallet connection core.
//!
//! This crate provides:
//! - The table of known EVM networks and their conversion to registry chains
//! - EIP-55 aware validation of account addresses reported by extensions
//! - The `EvmProvider` seam over an injected / WalletConnect extension
//! - `EvmAdapter`, which retargets one wallet session across EVM chain ids

pub mod adapter;
pub mod address;
pub mod chains;
pub mod error;
pub mod provider;

pub use adapter::EvmAdapter;
pub use error::EthError;
pub use provider::{Connector, EvmProvider};
