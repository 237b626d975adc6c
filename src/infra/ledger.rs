//! Boundary to the remote ledger.

use async_trait::async_trait;
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};

use crate::domain::error::Result;

/// Remote ledger operations the wallet depends on.
///
/// Every call may be slow or fail; callers bound them with a timeout and never retry.
/// Failures are reported as `WalletError::Network`.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Short human-readable name of the endpoint, for logs.
    fn endpoint(&self) -> String;

    /// Balance of `pubkey` in lamports.
    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64>;

    /// Ask the faucet to credit `lamports` to `pubkey`. Returns once the request is
    /// acknowledged, not when it is confirmed.
    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<Signature>;

    /// A recent blockhash to sign transactions against.
    async fn latest_blockhash(&self) -> Result<Hash>;

    /// Submit a signed transaction and wait for it to reach the configured commitment.
    async fn submit(&self, tx: &Transaction) -> Result<Signature>;
}
