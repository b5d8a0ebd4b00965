use thiserror::Error;
use wallet_adapter::AdapterError;

/// Solana chain family errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

impl From<SolError> for AdapterError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidAddress(_) => {
                AdapterError::ExternalConnectFailure(format!("extension returned {e}"))
            }
        }
    }
}
