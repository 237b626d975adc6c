//! End-to-end tests of the interactive menu, driven by scripted input.

use sol_wallet::{
    app::State,
    infra::{ledger::LedgerClient, sandbox::LAMPORTS_PER_SIGNATURE, store::CorruptRecordPolicy},
};
use solana_sdk::{native_token::LAMPORTS_PER_SOL, pubkey::Pubkey, signature::Signer};

use super::TestEnv;

#[tokio::test]
async fn test_menu_and_exit() {
    let env = TestEnv::new();
    let (app, output) = env.run("5\n").await;

    assert!(output.contains("Connected to sandbox (in-memory)"));
    assert!(output.contains("Created new wallet: "));
    for line in [
        "1. Create New Wallet",
        "2. Request Airdrop",
        "3. Send SOL to Address",
        "4. View Balance",
        "5. Exit",
    ] {
        assert!(output.contains(line), "missing {line:?}");
    }
    assert!(output.ends_with("Goodbye.\n"));
    assert!(matches!(app.state(), State::Terminated));
}

#[tokio::test]
async fn test_invalid_choice_shows_menu_again() {
    let env = TestEnv::new();
    let (_, output) = env.run("9\nhello\n5\n").await;

    assert_eq!(
        output
            .matches("Invalid choice. Please choose a valid option.")
            .count(),
        2
    );
    assert_eq!(output.matches("Main Menu:").count(), 3);
    assert_eq!(env.ledger.calls(), 0);
}

#[tokio::test]
async fn test_garbled_input_returns_to_menu() {
    let env = TestEnv::new();
    let recipient = Pubkey::new_unique();
    let script = [
        &b"\xff\xfe\n"[..],
        b"3\n",
        b"\xc3\x28\n",
        b"3\n",
        recipient.to_string().as_bytes(),
        b"\n\x80\n4\n5\n",
    ]
    .concat();

    let mut app = env.app_with_input(script);
    app.run().await.unwrap();
    let output = String::from_utf8(app.console().output().clone()).unwrap();

    assert!(output.contains("Invalid choice. Please choose a valid option."));
    assert!(output.contains("Error reading destination: invalid input: "));
    assert!(output.contains("Error reading amount: invalid input: "));
    assert!(output.contains("Current balance: 0 SOL"));
    assert!(output.ends_with("Goodbye.\n"));
    assert!(matches!(app.state(), State::Terminated));
}

#[tokio::test]
async fn test_end_of_input_terminates() {
    let env = TestEnv::new();
    let (app, _) = env.run("").await;
    assert!(matches!(app.state(), State::Terminated));

    // Input closing mid-transfer also ends the loop without touching the ledger.
    let (app, _) = env.run("3\n").await;
    assert!(matches!(app.state(), State::Terminated));
    assert_eq!(env.ledger.calls(), 0);
}

#[tokio::test]
async fn test_airdrop_then_balance() {
    let env = TestEnv::new();
    let (_, output) = env.run("2\n4\n5\n").await;

    assert!(output.contains("Airdrop requested: 1 SOL (signature "));
    assert!(output.contains("Current balance: 1 SOL"));
}

#[tokio::test]
async fn test_transfer_success() {
    let env = TestEnv::new();
    let wallet = env.funded_wallet(LAMPORTS_PER_SOL).await;
    let recipient = Pubkey::new_unique();

    let (_, output) = env.run(&format!("3\n{recipient}\n0.5\n5\n")).await;

    assert!(output.contains("Enter destination address: "));
    assert!(output.contains("Enter amount to send (SOL): "));
    assert!(output.contains(&format!(
        "Transfer successful! Sent 0.5 SOL to {recipient}. Transaction signature: "
    )));
    assert!(output.contains("Current balance: 0.499995 SOL"));

    assert_eq!(
        env.ledger.get_balance(&wallet).await.unwrap(),
        LAMPORTS_PER_SOL / 2 - LAMPORTS_PER_SIGNATURE
    );
    assert_eq!(
        env.ledger.get_balance(&recipient).await.unwrap(),
        LAMPORTS_PER_SOL / 2
    );
}

#[tokio::test]
async fn test_bad_amounts_never_reach_the_ledger() {
    let env = TestEnv::new();
    env.funded_wallet(LAMPORTS_PER_SOL).await;
    let recipient = Pubkey::new_unique();

    let script = ["abc", "-1", "0.0000000001", "1,5"]
        .iter()
        .map(|amount| format!("3\n{recipient}\n{amount}\n"))
        .collect::<String>()
        + "5\n";
    let (_, output) = env.run(&script).await;

    assert_eq!(output.matches("Error reading amount: invalid input: ").count(), 4);
    assert!(!output.contains("Transfer successful"));
    assert_eq!(env.ledger.calls(), 0);
}

#[tokio::test]
async fn test_bad_destination_returns_to_menu() {
    let env = TestEnv::new();
    let (_, output) = env.run("3\nnot-an-address\n5\n").await;

    assert!(output.contains("Error reading destination: invalid input: "));
    assert!(!output.contains("Enter amount to send"));
    assert_eq!(env.ledger.calls(), 0);
}

#[tokio::test]
async fn test_cosign_without_destination_secret_fails() {
    let mut env = TestEnv::new();
    env.set_cosign(true);
    let wallet = env.funded_wallet(LAMPORTS_PER_SOL).await;
    let recipient = Pubkey::new_unique();

    let (_, output) = env.run(&format!("3\n{recipient}\n0.1\n5\n")).await;

    assert!(output.contains("Error transferring SOL: signing error: "));
    // Balance is shown after a failed transfer and is unchanged.
    assert!(output.contains("Current balance: 1 SOL"));
    assert_eq!(
        env.ledger.get_balance(&wallet).await.unwrap(),
        LAMPORTS_PER_SOL
    );
    assert_eq!(env.ledger.get_balance(&recipient).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_wallet_replaces_stored_key() {
    let env = TestEnv::new();
    let old = env.funded_wallet(LAMPORTS_PER_SOL).await;

    let (app, output) = env.run("1\n4\n5\n").await;
    let new = app.service().pubkey().await.unwrap();

    assert_ne!(old, new);
    assert!(output.contains(&format!("New wallet created: {new}")));
    assert!(output.contains("The previous wallet key has been discarded."));
    assert!(output.contains("Current balance: 0 SOL"));

    let loaded = env.keystore().load().unwrap();
    assert_eq!(loaded.keypair.pubkey(), new);
}

#[tokio::test]
async fn test_corrupt_record_is_moved_aside() {
    let env = TestEnv::new();
    env.corrupt_wallet("{ not json");

    let (app, output) = env.run("5\n").await;

    assert!(output.contains("Warning: the stored wallet was unusable and was moved to "));
    assert!(app.service().pubkey().await.is_some());

    let backups: Vec<_> = std::fs::read_dir(env.dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("wallet.json.corrupt-")
        })
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        "{ not json"
    );
}

#[tokio::test]
async fn test_refuse_policy_disables_wallet_until_created() {
    let mut env = TestEnv::new();
    env.set_policy(CorruptRecordPolicy::Refuse);
    env.corrupt_wallet("{ not json");

    let (app, output) = env.run("4\n1\n4\n5\n").await;

    assert!(output.contains("Error loading wallet: storage error: "));
    assert!(output.contains("Wallet features are disabled until a new wallet is created"));
    assert!(output.contains("Error getting wallet balance: no wallet is loaded"));
    assert!(output.contains("New wallet created: "));
    assert!(output.contains("Current balance: 0 SOL"));
    assert!(app.service().pubkey().await.is_some());
}
