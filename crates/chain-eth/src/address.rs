use sha3::{Digest, Keccak256};

use crate::error::EthError;

/// Strip the `0x` prefix and check for exactly 40 hex characters.
fn hex_body(address: &str) -> Result<&str, EthError> {
    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| EthError::InvalidAddress("address must start with 0x".into()))?;

    if body.len() != 40 {
        return Err(EthError::InvalidAddress(format!(
            "expected 40 hex characters, got {}",
            body.len()
        )));
    }

    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(EthError::InvalidAddress(
            "address contains non-hex characters".into(),
        ));
    }

    Ok(body)
}

/// Applies EIP-55 mixed-case checksum encoding to an Ethereum address.
pub fn checksum_address(address: &str) -> Result<String, EthError> {
    let lower = hex_body(address)?.to_lowercase();
    let hash = hex::encode(Keccak256::digest(lower.as_bytes()));

    let mut checksummed = String::with_capacity(42);
    checksummed.push_str("0x");
    for (c, h) in lower.chars().zip(hash.chars()) {
        // Letters whose hash nibble is >= 8 are uppercased.
        if c.is_ascii_alphabetic() && h.to_digit(16).unwrap_or(0) >= 8 {
            checksummed.push(c.to_ascii_uppercase());
        } else {
            checksummed.push(c);
        }
    }

    Ok(checksummed)
}

/// Validates an Ethereum address string.
///
/// Single-case addresses carry no checksum and are accepted as-is; mixed-case
/// addresses must match their EIP-55 encoding.
pub fn validate_address(address: &str) -> Result<bool, EthError> {
    let body = hex_body(address)?;

    let is_all_lower = body.chars().all(|c| !c.is_ascii_uppercase());
    let is_all_upper = body.chars().all(|c| !c.is_ascii_lowercase());
    if is_all_lower || is_all_upper {
        return Ok(true);
    }

    Ok(checksum_address(address)? == format!("0x{body}"))
}

/// Normalize an account address reported by an extension to its checksummed
/// form, rejecting malformed input and mixed-case addresses with a bad checksum.
pub fn normalize_account(address: &str) -> Result<String, EthError> {
    if !validate_address(address)? {
        return Err(EthError::ChecksumMismatch(address.to_string()));
    }
    checksum_address(address)
}
