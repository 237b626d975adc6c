//! Persisted form of the local keypair.
//!
//! The on-disk layout matches the common Solana web wallet export:
//!
//! ```json
//! { "publicKey": "<base58>", "secretKey": [ 64 integers ] }
//! ```

use serde::{Deserialize, Serialize};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of an ed25519 keypair in bytes (32-byte seed followed by the public key).
pub const SECRET_KEY_LEN: usize = 64;

/// Why a stored record could not be turned back into a keypair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    SecretLength(usize),
    InvalidSecret(String),
    InvalidPublicKey(String),
    PublicKeyMismatch { stored: String, derived: String },
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordError::SecretLength(len) => {
                write!(f, "secret key has {len} bytes, expected {SECRET_KEY_LEN}")
            }
            RecordError::InvalidSecret(e) => write!(f, "secret key is invalid: {e}"),
            RecordError::InvalidPublicKey(e) => write!(f, "public key is invalid: {e}"),
            RecordError::PublicKeyMismatch { stored, derived } => write!(
                f,
                "stored public key {stored} does not match secret key (derives {derived})"
            ),
        }
    }
}

/// Wallet record stored at the keystore path.
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletRecord {
    pub public_key: String,
    pub secret_key: Vec<u8>,
}

impl WalletRecord {
    /// Capture a keypair's public encoding and full secret byte sequence.
    pub fn from_keypair(keypair: &Keypair) -> Self {
        Self {
            public_key: keypair.pubkey().to_string(),
            secret_key: keypair.to_bytes().to_vec(),
        }
    }

    /// Rebuild the keypair, checking the stored public key against the secret.
    pub fn to_keypair(&self) -> Result<Keypair, RecordError> {
        if self.secret_key.len() != SECRET_KEY_LEN {
            return Err(RecordError::SecretLength(self.secret_key.len()));
        }

        let stored: Pubkey = self
            .public_key
            .parse()
            .map_err(|e| RecordError::InvalidPublicKey(format!("{e}")))?;

        let keypair = Keypair::from_bytes(&self.secret_key)
            .map_err(|e| RecordError::InvalidSecret(e.to_string()))?;

        if keypair.pubkey() != stored {
            return Err(RecordError::PublicKeyMismatch {
                stored: self.public_key.clone(),
                derived: keypair.pubkey().to_string(),
            });
        }

        Ok(keypair)
    }
}
