use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use solana_sdk::commitment_config::CommitmentConfig;
use strum::{Display, EnumString};

use crate::{domain::tx_builder::TransferPolicy, infra::store::CorruptRecordPolicy};

/// Default file name of the wallet record inside the data directory.
pub const WALLET_FILE: &str = "wallet.json";

/// Default bound on a single network call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Get the data directory for the application.
pub fn get_data_dir() -> PathBuf {
    if let Ok(s) = std::env::var("SOL_WALLET_DATA") {
        PathBuf::from(s)
    } else if let Some(proj_dirs) = ProjectDirs::from("com", "sol-wallet", "sol-wallet") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

/// Cluster the wallet talks to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    Testnet,
    #[strum(to_string = "mainnet", serialize = "mainnet-beta")]
    Mainnet,
    Localnet,
    /// In-process ledger; nothing leaves the machine.
    Sandbox,
}

impl Network {
    pub fn default_rpc_url(&self) -> &'static str {
        match self {
            Network::Devnet => "https://api.devnet.solana.com",
            Network::Testnet => "https://api.testnet.solana.com",
            Network::Mainnet => "https://api.mainnet-beta.solana.com",
            Network::Localnet => "http://127.0.0.1:8899",
            Network::Sandbox => "memory://sandbox",
        }
    }

    /// Whether the cluster runs a faucet.
    pub fn has_faucet(&self) -> bool {
        !matches!(self, Network::Mainnet)
    }
}

/// Confirmation level for balance queries and submissions.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Commitment {
    /// Fastest, may be rolled back.
    Processed,
    #[default]
    Confirmed,
    /// Slowest, irreversible.
    Finalized,
}

impl Commitment {
    pub fn to_commitment_config(self) -> CommitmentConfig {
        match self {
            Commitment::Processed => CommitmentConfig::processed(),
            Commitment::Confirmed => CommitmentConfig::confirmed(),
            Commitment::Finalized => CommitmentConfig::finalized(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network: Network,
    pub rpc_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    pub path: PathBuf,
    pub on_corrupt: CorruptRecordPolicy,
    pub cosign_destination: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    pub wallet: WalletConfig,
    pub commitment: Commitment,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_network(Network::default())
    }
}

impl Config {
    /// Create config from CLI args.
    pub fn new(network: Network, rpc_url: Option<&str>) -> Self {
        let mut config = Self::from_network(network);
        if let Some(url) = rpc_url {
            config.network.rpc_url = url.to_string();
        }
        config
    }

    pub fn from_network(network: Network) -> Self {
        Self {
            network: NetworkConfig {
                network,
                rpc_url: network.default_rpc_url().to_string(),
            },
            wallet: WalletConfig {
                path: get_data_dir().join(WALLET_FILE),
                on_corrupt: CorruptRecordPolicy::default(),
                cosign_destination: false,
            },
            commitment: Commitment::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn transfer_policy(&self) -> TransferPolicy {
        TransferPolicy {
            cosign_destination: self.wallet.cosign_destination,
        }
    }
}
