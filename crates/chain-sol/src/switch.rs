//! Moving a Solana session to another cluster.
//!
//! The switch is a saga of two steps against the extension:
//!
//! 1. **release** the current session (`disconnect`);
//! 2. **reacquire** it against the target cluster endpoint (`connect`).
//!
//! If step 1 fails nothing has changed. If step 2 fails the saga rolls back
//! by reconnecting to the prior endpoint, so the caller ends up exactly where
//! it started. Only when the rollback itself fails is the session lost.

use tracing::{debug, error, warn};
use wallet_adapter::{Chain, ExtensionError, Session};

use crate::address::normalize_account;
use crate::provider::SolanaProvider;

/// How a cluster switch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The session now lives on the target cluster.
    Switched(Session),
    /// Step 1 failed; the prior session was never touched.
    Aborted { cause: String },
    /// Step 2 failed and the prior cluster was reacquired.
    RolledBack { restored: Session, cause: String },
    /// Step 2 failed and so did the rollback; the extension holds no session.
    Lost { cause: String, rollback: String },
}

/// A pending switch of `prior` onto `target`.
pub struct ClusterSwitch<'a> {
    provider: &'a dyn SolanaProvider,
    prior: Session,
    target: Chain,
}

impl<'a> ClusterSwitch<'a> {
    pub fn new(provider: &'a dyn SolanaProvider, prior: Session, target: Chain) -> Self {
        Self {
            provider,
            prior,
            target,
        }
    }

    pub async fn run(self) -> SwitchOutcome {
        if let Err(e) = self.release().await {
            warn!(error = %e, "cluster switch aborted: release failed");
            return SwitchOutcome::Aborted {
                cause: e.to_string(),
            };
        }

        let cause = match self.acquire(&self.target).await {
            Ok(account) => {
                debug!(cluster = %self.target.id, "cluster switch committed");
                return SwitchOutcome::Switched(Session {
                    wallet: self.prior.wallet,
                    chain: self.target,
                    account,
                });
            }
            Err(e) => e.to_string(),
        };

        warn!(cluster = %self.target.id, %cause, "reacquire failed, rolling back");
        match self.acquire(&self.prior.chain).await {
            Ok(account) => SwitchOutcome::RolledBack {
                restored: Session {
                    account,
                    ..self.prior
                },
                cause,
            },
            Err(e) => {
                error!(cluster = %self.prior.chain.id, error = %e, "rollback failed, session lost");
                SwitchOutcome::Lost {
                    cause,
                    rollback: e.to_string(),
                }
            }
        }
    }

    async fn release(&self) -> Result<(), ExtensionError> {
        self.provider.disconnect().await
    }

    /// Connect the prior wallet on `chain`. An unusable account counts as a
    /// failed connect, and the half-open session is released again.
    async fn acquire(&self, chain: &Chain) -> Result<String, ExtensionError> {
        let endpoint = chain
            .rpc_url()
            .ok_or_else(|| ExtensionError::new(format!("{} has no endpoint", chain.display_name())))?;

        let account = self
            .provider
            .connect(&self.prior.wallet.name, endpoint)
            .await?;

        match normalize_account(&account) {
            Ok(account) => Ok(account),
            Err(e) => {
                if let Err(release) = self.release().await {
                    warn!(error = %release, "could not release session with invalid account");
                }
                Err(ExtensionError::new(format!("extension returned {e}")))
            }
        }
    }
}
