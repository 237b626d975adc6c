//! Error taxonomy shared by the wallet operations.

use thiserror::Error;

pub type Result<T, E = WalletError> = std::result::Result<T, E>;

/// Failure of a single wallet operation.
///
/// Every variant renders as one line so the command loop can print it verbatim.
#[derive(Debug, Error)]
pub enum WalletError {
    /// The wallet record could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// An RPC call failed or timed out.
    #[error("network error: {0}")]
    Network(String),

    /// Operator input was rejected before anything touched the network.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A required signer could not sign the transaction.
    #[error("signing error: {0}")]
    Signing(String),

    /// No keypair is loaded; only "create new wallet" can proceed.
    #[error("no wallet is loaded, create one first (option 1)")]
    NoWallet,
}

impl WalletError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(one_line(&err.to_string()))
    }

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self::Network(one_line(&err.to_string()))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(one_line(&msg.into()))
    }

    pub fn signing(err: impl std::fmt::Display) -> Self {
        Self::Signing(one_line(&err.to_string()))
    }
}

/// Fold a multi-line message (e.g. simulation logs) into one line.
fn one_line(message: &str) -> String {
    message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}
