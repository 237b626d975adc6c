use std::path::PathBuf;

use clap::Parser;
use sol_wallet::{
    config::{Commitment, Config, DEFAULT_TIMEOUT_SECS, Network, WALLET_FILE, get_data_dir},
    infra::store::CorruptRecordPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "sol-wallet")]
#[command(author = "quake")]
#[command(version)]
#[command(about = "An interactive single-keypair wallet for Solana")]
pub struct Args {
    /// Network to connect to (devnet, testnet, mainnet, localnet, sandbox)
    #[arg(short, long, default_value_t = Network::Devnet)]
    pub network: Network,

    /// Custom RPC URL (overrides network default)
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Confirmation level for queries and submissions (processed, confirmed, finalized)
    #[arg(short, long, default_value_t = Commitment::Confirmed)]
    pub commitment: Commitment,

    /// Seconds to wait for a single network call before giving up
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Data directory path
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Wallet record path (defaults to wallet.json in the data directory)
    #[arg(short, long)]
    pub wallet: Option<PathBuf>,

    /// Require the destination to co-sign transfers
    #[arg(long)]
    pub cosign_destination: bool,

    /// What to do with an unreadable wallet record (regenerate, refuse)
    #[arg(long, default_value_t = CorruptRecordPolicy::Regenerate)]
    pub on_corrupt_wallet: CorruptRecordPolicy,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_data_dir)
    }

    pub fn to_config(&self) -> Config {
        let mut config = Config::new(self.network, self.rpc_url.as_deref());
        config.commitment = self.commitment;
        config.timeout_secs = self.timeout_secs;
        config.wallet.path = self
            .wallet
            .clone()
            .unwrap_or_else(|| self.data_dir().join(WALLET_FILE));
        config.wallet.on_corrupt = self.on_corrupt_wallet;
        config.wallet.cosign_destination = self.cosign_destination;
        config
    }
}
