use thiserror::Error;
use wallet_adapter::AdapterError;

/// EVM chain family errors.
#[derive(Debug, Error)]
pub enum EthError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("checksum mismatch for {0}")]
    ChecksumMismatch(String),

    #[error("walletconnect project id not configured")]
    MissingProjectId,
}

impl From<EthError> for AdapterError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidAddress(_) | EthError::ChecksumMismatch(_) => {
                AdapterError::ExternalConnectFailure(format!("extension returned {e}"))
            }
            EthError::MissingProjectId => AdapterError::ExternalConnectFailure(e.to_string()),
        }
    }
}
