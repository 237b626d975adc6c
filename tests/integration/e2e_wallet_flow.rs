//! End-to-end wallet flow through `WalletService`.
//!
//! 1. Open a fresh wallet
//! 2. Fund it through the faucet
//! 3. Send part of the balance away
//! 4. Reopen from disk and see the same key and balance

use std::time::Duration;

use sol_wallet::{
    config::{Config, Network},
    domain::{
        error::WalletError,
        service::WalletService,
        tx_builder::{Destination, parse_destination},
    },
    infra::{
        ledger::LedgerClient,
        sandbox::{LAMPORTS_PER_SIGNATURE, SandboxLedger},
        store::LoadOutcome,
    },
};
use solana_sdk::{
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use super::{TestEnv, poll_balance};

#[tokio::test]
async fn test_fund_send_and_reopen() {
    let env = TestEnv::new();
    let service = env.service();

    assert_eq!(service.open().await.unwrap(), LoadOutcome::CreatedFresh);
    let wallet = service.pubkey().await.unwrap();
    assert_eq!(service.balance().await.unwrap(), 0);

    service.request_airdrop(2 * LAMPORTS_PER_SOL).await.unwrap();
    assert_eq!(poll_balance(&service, 2 * LAMPORTS_PER_SOL).await, 2 * LAMPORTS_PER_SOL);

    let recipient = Pubkey::new_unique();
    let destination = parse_destination(&recipient.to_string()).unwrap();
    let receipt = service
        .transfer(destination, LAMPORTS_PER_SOL / 2)
        .await
        .unwrap();

    let expected = 2 * LAMPORTS_PER_SOL - LAMPORTS_PER_SOL / 2 - LAMPORTS_PER_SIGNATURE;
    assert_eq!(receipt.destination, recipient);
    assert_eq!(receipt.balance_after, Some(expected));
    assert_eq!(
        env.ledger.get_balance(&recipient).await.unwrap(),
        LAMPORTS_PER_SOL / 2
    );

    // A second process over the same record sees the same key and funds.
    let reopened = env.service();
    assert_eq!(reopened.open().await.unwrap(), LoadOutcome::Loaded);
    assert_eq!(reopened.pubkey().await, Some(wallet));
    assert_eq!(reopened.balance().await.unwrap(), expected);
}

#[tokio::test]
async fn test_overdraft_is_a_network_error() {
    let env = TestEnv::new();
    let wallet = env.funded_wallet(LAMPORTS_PER_SOL).await;
    let service = env.service();
    service.open().await.unwrap();

    let err = service
        .transfer(Destination::Address(Pubkey::new_unique()), 2 * LAMPORTS_PER_SOL)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::Network(_)), "{err}");
    assert_eq!(
        env.ledger.get_balance(&wallet).await.unwrap(),
        LAMPORTS_PER_SOL
    );
}

#[tokio::test]
async fn test_cosigned_transfer_between_own_keys() {
    let mut env = TestEnv::new();
    env.set_cosign(true);
    env.funded_wallet(LAMPORTS_PER_SOL).await;
    let service = env.service();
    service.open().await.unwrap();

    let second = Keypair::new();
    let destination = parse_destination(&second.to_base58_string()).unwrap();
    let receipt = service.transfer(destination, 1_000).await.unwrap();

    assert_eq!(receipt.destination, second.pubkey());
    assert_eq!(
        receipt.balance_after,
        Some(LAMPORTS_PER_SOL - 1_000 - 2 * LAMPORTS_PER_SIGNATURE)
    );
}

#[tokio::test]
async fn test_mainnet_has_no_airdrop() {
    let env = TestEnv::with_ledger(SandboxLedger::new().without_faucet());
    let mut config = Config::from_network(Network::Mainnet);
    config.wallet.path = env.wallet_path();
    let service = WalletService::from_config(&config, env.ledger.clone());
    service.open().await.unwrap();

    let err = service.request_airdrop(LAMPORTS_PER_SOL).await.unwrap_err();
    assert!(matches!(err, WalletError::Validation(_)));
    assert_eq!(env.ledger.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_ledger_times_out_each_call() {
    let mut env = TestEnv::with_ledger(SandboxLedger::new().with_latency(Duration::from_secs(60)));
    env.config.timeout_secs = 5;
    let service = env.service();
    service.open().await.unwrap();

    let err = service.balance().await.unwrap_err();
    assert!(matches!(err, WalletError::Network(ref msg) if msg.contains("timed out")));

    // The loop stays usable: the next call is bounded the same way.
    let err = service.request_airdrop(LAMPORTS_PER_SOL).await.unwrap_err();
    assert!(matches!(err, WalletError::Network(_)));
}
