//! Solana chain family support for the wallet connection core.
//!
//! Solana wallets have no notion of "switching network": a session is bound
//! to one cluster endpoint. Moving to another cluster therefore means
//! releasing the session and reacquiring it against the new endpoint, which
//! this crate models as a two-step saga with rollback (see [`switch`]).

pub mod adapter;
pub mod address;
pub mod clusters;
pub mod error;
pub mod provider;
pub mod switch;

pub use adapter::SolanaAdapter;
pub use address::{normalize_account, validate_address};
pub use error::SolError;
pub use provider::SolanaProvider;
