//! Solana account address validation.
//!
//! Solana addresses are Base58-encoded 32-byte Ed25519 public keys. Wallet
//! extensions report them in that form; anything else means the extension
//! handed back garbage.

use crate::error::SolError;

fn decode(address: &str) -> Result<[u8; 32], SolError> {
    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| SolError::InvalidAddress(format!("base58 decode failed: {e}")))?;

    bytes.try_into().map_err(|v: Vec<u8>| {
        SolError::InvalidAddress(format!("expected 32 bytes, got {}", v.len()))
    })
}

/// Validate a Solana address string: Base58 that decodes to exactly 32 bytes.
pub fn validate_address(address: &str) -> Result<bool, SolError> {
    decode(address).map(|_| true)
}

/// Normalize an account reported by an extension: surrounding whitespace is
/// dropped and the result must be a valid address.
pub fn normalize_account(address: &str) -> Result<String, SolError> {
    let trimmed = address.trim();
    decode(trimmed)?;
    Ok(trimmed.to_string())
}
