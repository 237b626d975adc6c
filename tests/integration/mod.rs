//! Integration tests for sol-wallet.
//!
//! Every test runs against an in-memory `SandboxLedger` and a wallet record inside its
//! own temporary directory, so nothing touches a real cluster.

pub mod e2e_command_loop;
pub mod e2e_wallet_flow;

use std::{io::Cursor, path::PathBuf, sync::Arc, time::Duration};

use sol_wallet::{
    app::App,
    config::{Config, Network},
    console::Console,
    domain::service::WalletService,
    infra::{
        sandbox::SandboxLedger,
        store::{CorruptRecordPolicy, KeyStore},
    },
};
use solana_sdk::{pubkey::Pubkey, signature::Signer};
use tempfile::TempDir;

/// Test environment: a private data directory and a sandbox ledger.
pub struct TestEnv {
    pub dir: TempDir,
    pub ledger: Arc<SandboxLedger>,
    pub config: Config,
}

/// Console type driven by a scripted input.
pub type ScriptedApp = App<Cursor<Vec<u8>>, Vec<u8>>;

impl TestEnv {
    pub fn new() -> Self {
        Self::with_ledger(SandboxLedger::new())
    }

    pub fn with_ledger(ledger: SandboxLedger) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let mut config = Config::from_network(Network::Sandbox);
        config.wallet.path = dir.path().join("wallet.json");
        Self {
            dir,
            ledger: Arc::new(ledger),
            config,
        }
    }

    pub fn wallet_path(&self) -> PathBuf {
        self.config.wallet.path.clone()
    }

    pub fn keystore(&self) -> KeyStore {
        KeyStore::new(self.wallet_path(), self.config.wallet.on_corrupt)
    }

    pub fn service(&self) -> WalletService {
        WalletService::from_config(&self.config, self.ledger.clone())
    }

    /// Create the wallet record ahead of time and fund it with `lamports`.
    pub async fn funded_wallet(&self, lamports: u64) -> Pubkey {
        let pubkey = self.keystore().load().expect("create wallet").keypair.pubkey();
        self.ledger.credit(&pubkey, lamports).await;
        pubkey
    }

    pub fn app(&self, script: &str) -> ScriptedApp {
        self.app_with_input(script.as_bytes().to_vec())
    }

    /// Like `app`, for input that need not be valid UTF-8.
    pub fn app_with_input(&self, input: Vec<u8>) -> ScriptedApp {
        App::new(self.service(), Console::new(Cursor::new(input), Vec::new()))
    }

    /// Run the command loop over `script` until it terminates; returns the app and
    /// everything it printed.
    pub async fn run(&self, script: &str) -> (ScriptedApp, String) {
        let mut app = self.app(script);
        app.run().await.expect("command loop");
        let output = String::from_utf8(app.console().output().clone()).expect("utf-8 output");
        (app, output)
    }

    pub fn corrupt_wallet(&self, contents: &str) {
        std::fs::write(self.wallet_path(), contents).expect("write corrupt record");
    }

    pub fn set_policy(&mut self, policy: CorruptRecordPolicy) {
        self.config.wallet.on_corrupt = policy;
    }

    pub fn set_cosign(&mut self, cosign: bool) {
        self.config.wallet.cosign_destination = cosign;
    }
}

/// Poll the service balance until it reaches `at_least`, as an airdrop may land after
/// its acknowledgement.
pub async fn poll_balance(service: &WalletService, at_least: u64) -> u64 {
    let mut balance = 0;
    for _ in 0..50 {
        balance = service.balance().await.expect("balance query");
        if balance >= at_least {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    balance
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
