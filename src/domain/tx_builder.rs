//! Transaction builder for SOL transfers.
//!
//! Builds a single system-program transfer from the local wallet and signs it with
//! exactly the keypairs the message requires.

use base64::Engine;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_instruction,
    transaction::Transaction,
};
use tracing::{debug, warn};

use crate::domain::{
    error::{Result, WalletError},
    wallet::SECRET_KEY_LEN,
};

/// Where a transfer goes.
pub enum Destination {
    /// A public address. Only the local wallet signs.
    Address(Pubkey),
    /// A full keypair for the destination, entered by the operator.
    Signer(Keypair),
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print secret key bytes.
        match self {
            Destination::Address(pubkey) => write!(f, "Address({pubkey})"),
            Destination::Signer(keypair) => write!(f, "Signer({})", keypair.pubkey()),
        }
    }
}

impl Destination {
    pub fn pubkey(&self) -> Pubkey {
        match self {
            Destination::Address(pubkey) => *pubkey,
            Destination::Signer(keypair) => keypair.pubkey(),
        }
    }

    pub fn keypair(&self) -> Option<&Keypair> {
        match self {
            Destination::Address(_) => None,
            Destination::Signer(keypair) => Some(keypair),
        }
    }
}

/// Signing policy for transfers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Require the destination to co-sign, as when moving funds between two keys the
    /// operator controls.
    pub cosign_destination: bool,
}

/// A built but unsigned transfer.
#[derive(Debug, Clone)]
pub struct TransferEnvelope {
    pub tx: Transaction,
    pub from: Pubkey,
    pub to: Pubkey,
    pub lamports: u64,
}

impl TransferEnvelope {
    /// Accounts whose signatures the message requires, fee payer first.
    pub fn required_signers(&self) -> &[Pubkey] {
        let count = self.tx.message.header.num_required_signatures as usize;
        &self.tx.message.account_keys[..count]
    }
}

/// Parse a destination typed by the operator.
///
/// Accepts a base58 public key, or a 64-byte secret key encoded as base58, base64, or a
/// JSON array of integers.
pub fn parse_destination(input: &str) -> Result<Destination> {
    let input = input.trim();
    if input.is_empty() {
        return Err(WalletError::validation("destination address is empty"));
    }

    if input.starts_with('[') {
        let bytes: Vec<u8> = serde_json::from_str(input).map_err(|e| {
            WalletError::validation(format!("destination key array is malformed: {e}"))
        })?;
        return keypair_destination(&bytes);
    }

    if let Ok(bytes) = bs58::decode(input).into_vec() {
        match bytes.len() {
            32 => return Ok(Destination::Address(Pubkey::new_from_array(to_array(&bytes)))),
            SECRET_KEY_LEN => return keypair_destination(&bytes),
            _ => {}
        }
    }

    if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(input)
        && bytes.len() == SECRET_KEY_LEN
    {
        return keypair_destination(&bytes);
    }

    Err(WalletError::validation(format!(
        "'{input}' is not a valid base58 address"
    )))
}

fn to_array(bytes: &[u8]) -> [u8; 32] {
    let mut array = [0u8; 32];
    array.copy_from_slice(bytes);
    array
}

fn keypair_destination(bytes: &[u8]) -> Result<Destination> {
    if bytes.len() != SECRET_KEY_LEN {
        return Err(WalletError::validation(format!(
            "destination secret key has {} bytes, expected {SECRET_KEY_LEN}",
            bytes.len()
        )));
    }
    let keypair = Keypair::from_bytes(bytes)
        .map_err(|e| WalletError::validation(format!("destination secret key is invalid: {e}")))?;
    Ok(Destination::Signer(keypair))
}

/// Build an unsigned transfer of `lamports` from `from` to `destination`.
pub fn build_transfer(
    from: &Pubkey,
    destination: &Destination,
    lamports: u64,
    policy: TransferPolicy,
) -> TransferEnvelope {
    let to = destination.pubkey();
    let mut instruction = system_instruction::transfer(from, &to, lamports);

    if policy.cosign_destination {
        // The system program ignores the flag; it only forces the destination signature.
        for meta in instruction.accounts.iter_mut().filter(|m| m.pubkey == to) {
            meta.is_signer = true;
        }
    }

    let tx = Transaction::new_with_payer(&[instruction], Some(from));
    debug!(
        "Built transfer of {} lamports from {} to {} ({} signer(s))",
        lamports, from, to, tx.message.header.num_required_signatures
    );

    TransferEnvelope {
        tx,
        from: *from,
        to,
        lamports,
    }
}

/// Sign the envelope with `signers`.
///
/// Every required signer must be present and every listed signer must be required.
pub fn sign(
    envelope: TransferEnvelope,
    signers: &[&Keypair],
    recent_blockhash: Hash,
) -> Result<Transaction> {
    check_signers(&envelope, signers)?;

    let mut tx = envelope.tx;
    tx.try_sign(signers, recent_blockhash)
        .map_err(WalletError::signing)?;
    Ok(tx)
}

/// Check that `signers` matches the envelope's required signers exactly.
pub fn check_signers(envelope: &TransferEnvelope, signers: &[&Keypair]) -> Result<()> {
    let required = envelope.required_signers();

    if let Some(missing) = required
        .iter()
        .find(|pubkey| !signers.iter().any(|s| s.pubkey() == **pubkey))
    {
        return Err(WalletError::signing(format!(
            "no private key available for required signer {missing}"
        )));
    }

    if let Some(extra) = signers.iter().find(|s| !required.contains(&s.pubkey())) {
        warn!("Refusing to sign with unrequired keypair {}", extra.pubkey());
        return Err(WalletError::signing(format!(
            "keypair {} is not a signer of this transaction",
            extra.pubkey()
        )));
    }

    Ok(())
}
