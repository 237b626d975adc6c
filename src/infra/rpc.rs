use std::time::Duration;

use async_trait::async_trait;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{hash::Hash, pubkey::Pubkey, signature::Signature, transaction::Transaction};
use tracing::debug;

use crate::{
    config::Config,
    domain::error::{Result, WalletError},
    infra::ledger::LedgerClient,
};

/// Solana JSON-RPC client wrapper.
pub struct RpcLedger {
    client: RpcClient,
}

impl RpcLedger {
    pub fn new(config: &Config) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            config.network.rpc_url.clone(),
            Duration::from_secs(config.timeout_secs),
            config.commitment.to_commitment_config(),
        );
        Self { client }
    }
}

/// Keep the full error (simulation logs included) in the log; the operator gets it
/// folded onto one line.
fn rpc_error(err: ClientError) -> WalletError {
    debug!("RPC call failed: {:?}", err.kind());
    WalletError::network(err)
}

#[async_trait]
impl LedgerClient for RpcLedger {
    fn endpoint(&self) -> String {
        self.client.url()
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        let lamports = self
            .client
            .get_balance(pubkey)
            .await
            .map_err(rpc_error)?;
        debug!("Balance of {}: {} lamports", pubkey, lamports);
        Ok(lamports)
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<Signature> {
        self.client
            .request_airdrop(pubkey, lamports)
            .await
            .map_err(rpc_error)
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(rpc_error)
    }

    async fn submit(&self, tx: &Transaction) -> Result<Signature> {
        self.client
            .send_and_confirm_transaction(tx)
            .await
            .map_err(rpc_error)
    }
}
