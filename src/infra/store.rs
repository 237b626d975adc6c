use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use solana_sdk::signature::{Keypair, Signer};
use strum::{Display, EnumString};
use tracing::{error, info, warn};

use crate::domain::{
    error::{Result, WalletError},
    wallet::WalletRecord,
};

/// What to do when a wallet record exists but cannot be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CorruptRecordPolicy {
    /// Move the bad record aside and mint a fresh key.
    #[default]
    Regenerate,
    /// Leave the record untouched and fail the load.
    Refuse,
}

/// How `KeyStore::load` obtained its keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// An existing record was reused.
    Loaded,
    /// No record existed; a new key was generated and saved.
    CreatedFresh,
    /// The record was unusable; it was moved to `backup` and a new key was saved.
    RecoveredFromCorrupt { backup: PathBuf },
}

#[derive(Debug)]
pub struct LoadedKey {
    pub keypair: Keypair,
    pub outcome: LoadOutcome,
}

#[derive(Debug)]
enum ReadFailure {
    Missing,
    Unreadable(io::Error),
    Corrupt(String),
}

/// File-backed storage for the single wallet keypair.
#[derive(Debug, Clone)]
pub struct KeyStore {
    path: PathBuf,
    policy: CorruptRecordPolicy,
}

impl KeyStore {
    pub fn new(path: impl Into<PathBuf>, policy: CorruptRecordPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored keypair, generating and saving one when none is usable.
    pub fn load(&self) -> Result<LoadedKey> {
        match self.read_record() {
            Ok(keypair) => {
                info!("Loaded wallet {} from {}", keypair.pubkey(), self.path.display());
                Ok(LoadedKey {
                    keypair,
                    outcome: LoadOutcome::Loaded,
                })
            }
            Err(ReadFailure::Missing) => {
                let keypair = self.generate()?;
                warn!(
                    "No wallet record at {}; created new wallet {}",
                    self.path.display(),
                    keypair.pubkey()
                );
                Ok(LoadedKey {
                    keypair,
                    outcome: LoadOutcome::CreatedFresh,
                })
            }
            Err(ReadFailure::Unreadable(e)) => self.recover(format!("unreadable: {e}")),
            Err(ReadFailure::Corrupt(e)) => self.recover(format!("corrupt: {e}")),
        }
    }

    fn recover(&self, reason: String) -> Result<LoadedKey> {
        error!("Wallet record {} is {}", self.path.display(), reason);

        if self.policy == CorruptRecordPolicy::Refuse {
            return Err(WalletError::Storage(format!(
                "wallet record {} is {}",
                self.path.display(),
                reason
            )));
        }

        let backup = self.quarantine()?;
        let keypair = self.generate()?;
        error!(
            "Moved unusable wallet record to {}; created new wallet {}",
            backup.display(),
            keypair.pubkey()
        );
        Ok(LoadedKey {
            keypair,
            outcome: LoadOutcome::RecoveredFromCorrupt { backup },
        })
    }

    /// Replace the stored record with a freshly generated keypair.
    ///
    /// The previous key is gone for good unless it was backed up elsewhere.
    pub fn overwrite(&self) -> Result<Keypair> {
        let keypair = self.generate()?;
        info!("Overwrote wallet record with new wallet {}", keypair.pubkey());
        Ok(keypair)
    }

    fn generate(&self) -> Result<Keypair> {
        let keypair = Keypair::new();
        self.persist(&keypair)?;
        Ok(keypair)
    }

    fn read_record(&self) -> std::result::Result<Keypair, ReadFailure> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ReadFailure::Missing),
            Err(e) => return Err(ReadFailure::Unreadable(e)),
        };

        let record: WalletRecord =
            serde_json::from_slice(&data).map_err(|e| ReadFailure::Corrupt(e.to_string()))?;
        record
            .to_keypair()
            .map_err(|e| ReadFailure::Corrupt(e.to_string()))
    }

    /// Write the record atomically: temp file, flush, rename.
    fn persist(&self, keypair: &Keypair) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let record = WalletRecord::from_keypair(keypair);
        let json = serde_json::to_vec_pretty(&record).map_err(WalletError::storage)?;

        let tmp_path = self.tmp_path();
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path).map_err(|e| self.write_error(e))?;
        file.write_all(&json).map_err(|e| self.write_error(e))?;
        file.sync_all().map_err(|e| self.write_error(e))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            self.write_error(e)
        })
    }

    fn quarantine(&self) -> Result<PathBuf> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let backup = PathBuf::from(format!("{}.corrupt-{}", self.path.display(), millis));
        fs::rename(&self.path, &backup).map_err(|e| {
            WalletError::Storage(format!(
                "cannot move unusable wallet record {} aside: {e}",
                self.path.display()
            ))
        })?;
        Ok(backup)
    }

    fn tmp_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.tmp", self.path.display()))
    }

    fn write_error(&self, e: io::Error) -> WalletError {
        WalletError::Storage(format!("cannot write {}: {e}", self.path.display()))
    }
}
