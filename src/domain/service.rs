//! Wallet operations: create, airdrop, transfer, balance.
//!
//! `WalletService` owns the active keypair and hands it to each operation for the
//! duration of one request. Every ledger call is bounded by the configured timeout and
//! is never retried.

use std::{future::Future, sync::Arc, time::Duration};

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    config::Config,
    domain::{
        amount::format_sol,
        error::{Result, WalletError},
        tx_builder::{self, Destination, TransferPolicy},
    },
    infra::{
        ledger::LedgerClient,
        store::{KeyStore, LoadOutcome},
    },
};

/// Result of a confirmed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub signature: Signature,
    pub destination: Pubkey,
    pub lamports: u64,
    /// Balance re-queried after confirmation; `None` if that query failed.
    pub balance_after: Option<u64>,
}

pub struct WalletService {
    keystore: KeyStore,
    ledger: Arc<dyn LedgerClient>,
    policy: TransferPolicy,
    timeout: Duration,
    faucet: bool,
    wallet: RwLock<Option<Arc<Keypair>>>,
}

impl WalletService {
    pub fn new(
        keystore: KeyStore,
        ledger: Arc<dyn LedgerClient>,
        policy: TransferPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            keystore,
            ledger,
            policy,
            timeout,
            faucet: true,
            wallet: RwLock::new(None),
        }
    }

    pub fn from_config(config: &Config, ledger: Arc<dyn LedgerClient>) -> Self {
        let keystore = KeyStore::new(config.wallet.path.clone(), config.wallet.on_corrupt);
        Self::new(
            keystore,
            ledger,
            config.transfer_policy(),
            Duration::from_secs(config.timeout_secs),
        )
        .with_faucet(config.network.network.has_faucet())
    }

    /// Whether airdrops may be requested at all.
    pub fn with_faucet(mut self, faucet: bool) -> Self {
        self.faucet = faucet;
        self
    }

    pub fn ledger_endpoint(&self) -> String {
        self.ledger.endpoint()
    }

    /// Load (or create) the wallet at startup.
    ///
    /// On a storage error the service stays without a wallet; every operation except
    /// `create_wallet` then fails with `WalletError::NoWallet`.
    pub async fn open(&self) -> Result<LoadOutcome> {
        let mut wallet = self.wallet.write().await;
        match self.keystore.load() {
            Ok(loaded) => {
                *wallet = Some(Arc::new(loaded.keypair));
                Ok(loaded.outcome)
            }
            Err(e) => {
                warn!("Starting without a wallet: {}", e);
                *wallet = None;
                Err(e)
            }
        }
    }

    pub async fn pubkey(&self) -> Option<Pubkey> {
        self.wallet.read().await.as_ref().map(|k| k.pubkey())
    }

    /// Replace the wallet with a freshly generated one.
    pub async fn create_wallet(&self) -> Result<Pubkey> {
        // Held across the overwrite so no operation can pick up the old key mid-swap.
        let mut wallet = self.wallet.write().await;
        let keypair = self.keystore.overwrite()?;
        let pubkey = keypair.pubkey();
        *wallet = Some(Arc::new(keypair));
        Ok(pubkey)
    }

    /// Ask the faucet for `lamports`. Returns the acknowledgement signature.
    pub async fn request_airdrop(&self, lamports: u64) -> Result<Signature> {
        if !self.faucet {
            return Err(WalletError::validation(
                "airdrops are not available on this network",
            ));
        }
        if lamports == 0 {
            return Err(WalletError::validation("airdrop amount must be greater than zero"));
        }

        let wallet = self.active().await?;
        let signature = self
            .bounded("airdrop request", self.ledger.request_airdrop(&wallet.pubkey(), lamports))
            .await?;
        info!(
            "Airdrop of {} SOL to {} acknowledged: {}",
            format_sol(lamports),
            wallet.pubkey(),
            signature
        );
        Ok(signature)
    }

    /// Transfer `lamports` to `destination`, then re-query the balance.
    pub async fn transfer(&self, destination: Destination, lamports: u64) -> Result<TransferReceipt> {
        if lamports == 0 {
            return Err(WalletError::validation("transfer amount must be greater than zero"));
        }
        let wallet = self.active().await?;

        let envelope =
            tx_builder::build_transfer(&wallet.pubkey(), &destination, lamports, self.policy);

        let mut signers: Vec<&Keypair> = vec![wallet.as_ref()];
        if self.policy.cosign_destination {
            if let Some(keypair) = destination.keypair() {
                signers.push(keypair);
            }
        } else if destination.keypair().is_some() {
            info!("Destination secret key supplied but not needed; only the wallet signs");
        }
        tx_builder::check_signers(&envelope, &signers)?;

        let blockhash = self
            .bounded("blockhash query", self.ledger.latest_blockhash())
            .await?;
        let tx = tx_builder::sign(envelope, &signers, blockhash)?;

        let signature = self
            .bounded("transaction submission", self.ledger.submit(&tx))
            .await?;
        info!(
            "Transferred {} SOL from {} to {}: {}",
            format_sol(lamports),
            wallet.pubkey(),
            destination.pubkey(),
            signature
        );

        let balance_after = match self
            .bounded("balance query", self.ledger.get_balance(&wallet.pubkey()))
            .await
        {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Transfer confirmed but balance refresh failed: {}", e);
                None
            }
        };

        Ok(TransferReceipt {
            signature,
            destination: destination.pubkey(),
            lamports,
            balance_after,
        })
    }

    /// Balance of the wallet in lamports.
    pub async fn balance(&self) -> Result<u64> {
        let wallet = self.active().await?;
        self.bounded("balance query", self.ledger.get_balance(&wallet.pubkey()))
            .await
    }

    async fn active(&self) -> Result<Arc<Keypair>> {
        self.wallet.read().await.clone().ok_or(WalletError::NoWallet)
    }

    async fn bounded<T>(&self, what: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{} timed out after {:?}", what, self.timeout);
                Err(WalletError::Network(format!(
                    "{what} timed out after {:?}",
                    self.timeout
                )))
            }
        }
    }
}
