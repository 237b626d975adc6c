//! In-memory ledger for the `sandbox` network.
//!
//! Behaves like a single validator with a faucet: it verifies signatures, checks
//! blockhashes, charges the per-signature fee, and settles system transfers instantly.
//! Nothing survives the process.

use std::{
    collections::{HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use async_trait::async_trait;
use solana_sdk::{
    hash::{Hash, hash},
    native_token::LAMPORTS_PER_SOL,
    pubkey::Pubkey,
    signature::Signature,
    system_program,
    transaction::Transaction,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    domain::error::{Result, WalletError},
    infra::ledger::LedgerClient,
};

/// Fee charged to the payer for each signature, as on mainnet.
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Largest single airdrop the faucet hands out.
pub const MAX_AIRDROP_LAMPORTS: u64 = 5 * LAMPORTS_PER_SOL;

/// `SystemInstruction::Transfer` discriminant.
const SYSTEM_TRANSFER: u32 = 2;

/// How many recent blockhashes stay valid.
const BLOCKHASH_WINDOW: usize = 150;

#[derive(Debug, Default)]
struct State {
    balances: HashMap<Pubkey, u64>,
    blockhashes: Vec<Hash>,
    processed: HashSet<Signature>,
    slot: u64,
}

impl State {
    fn next_blockhash(&mut self) -> Hash {
        self.slot += 1;
        let blockhash = hash(&self.slot.to_le_bytes());
        self.blockhashes.push(blockhash);
        if self.blockhashes.len() > BLOCKHASH_WINDOW {
            self.blockhashes.remove(0);
        }
        blockhash
    }
}

/// In-memory `LedgerClient`.
#[derive(Debug)]
pub struct SandboxLedger {
    state: Mutex<State>,
    latency: Option<Duration>,
    faucet_enabled: bool,
    calls: AtomicUsize,
}

impl Default for SandboxLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl SandboxLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            latency: None,
            faucet_enabled: true,
            calls: AtomicUsize::new(0),
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Reject airdrop requests, as mainnet does.
    pub fn without_faucet(mut self) -> Self {
        self.faucet_enabled = false;
        self
    }

    /// Number of ledger calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Credit an account directly, bypassing the faucet.
    pub async fn credit(&self, pubkey: &Pubkey, lamports: u64) {
        let mut state = self.state.lock().await;
        let balance = state.balances.entry(*pubkey).or_default();
        *balance = balance.saturating_add(lamports);
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

/// Decode a system-program transfer into (from, to, lamports).
fn decode_transfer(tx: &Transaction, index: usize) -> Result<(Pubkey, Pubkey, u64)> {
    let message = &tx.message;
    let ix = &message.instructions[index];
    let key = |i: u8| {
        message
            .account_keys
            .get(i as usize)
            .copied()
            .ok_or_else(|| WalletError::network("instruction references a missing account"))
    };

    if key(ix.program_id_index)? != system_program::id() {
        return Err(WalletError::network("sandbox only executes system program instructions"));
    }
    if ix.data.len() != 12 || ix.data[..4] != SYSTEM_TRANSFER.to_le_bytes() {
        return Err(WalletError::network("sandbox only executes system transfers"));
    }
    let [from, to] = ix.accounts.as_slice() else {
        return Err(WalletError::network("transfer needs exactly two accounts"));
    };

    if !message.is_signer(usize::from(*from)) {
        return Err(WalletError::network(
            "transaction rejected: transfer source did not sign",
        ));
    }

    let mut amount = [0u8; 8];
    amount.copy_from_slice(&ix.data[4..12]);
    Ok((key(*from)?, key(*to)?, u64::from_le_bytes(amount)))
}

#[async_trait]
impl LedgerClient for SandboxLedger {
    fn endpoint(&self) -> String {
        "sandbox (in-memory)".to_string()
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64> {
        self.enter().await;
        let state = self.state.lock().await;
        Ok(state.balances.get(pubkey).copied().unwrap_or(0))
    }

    async fn request_airdrop(&self, pubkey: &Pubkey, lamports: u64) -> Result<Signature> {
        self.enter().await;
        if !self.faucet_enabled {
            return Err(WalletError::network("airdrops are not available on this network"));
        }
        if lamports > MAX_AIRDROP_LAMPORTS {
            return Err(WalletError::network(format!(
                "airdrop of {lamports} lamports exceeds the faucet limit of {MAX_AIRDROP_LAMPORTS}"
            )));
        }

        let mut state = self.state.lock().await;
        let balance = state.balances.entry(*pubkey).or_default();
        *balance = balance.saturating_add(lamports);
        let blockhash = state.next_blockhash();
        debug!("Sandbox airdropped {} lamports to {}", lamports, pubkey);

        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(blockhash.as_ref());
        bytes[32..].copy_from_slice(pubkey.as_ref());
        Ok(Signature::from(bytes))
    }

    async fn latest_blockhash(&self) -> Result<Hash> {
        self.enter().await;
        Ok(self.state.lock().await.next_blockhash())
    }

    async fn submit(&self, tx: &Transaction) -> Result<Signature> {
        self.enter().await;

        tx.verify()
            .map_err(|e| WalletError::network(format!("transaction rejected: {e}")))?;
        let signature = *tx
            .signatures
            .first()
            .ok_or_else(|| WalletError::network("transaction has no signatures"))?;

        let mut state = self.state.lock().await;
        if !state.blockhashes.contains(&tx.message.recent_blockhash) {
            return Err(WalletError::network("transaction rejected: blockhash not found"));
        }
        if state.processed.contains(&signature) {
            return Err(WalletError::network("transaction rejected: already processed"));
        }

        // Apply on a copy so a failing instruction leaves no partial effects.
        let mut balances = state.balances.clone();
        let payer = tx.message.account_keys[0];
        let fee = LAMPORTS_PER_SIGNATURE * u64::from(tx.message.header.num_required_signatures);
        debit(&mut balances, &payer, fee)?;

        for index in 0..tx.message.instructions.len() {
            let (from, to, lamports) = decode_transfer(tx, index)?;
            debit(&mut balances, &from, lamports)?;
            let balance = balances.entry(to).or_default();
            *balance = balance.saturating_add(lamports);
        }

        state.balances = balances;
        state.processed.insert(signature);
        debug!("Sandbox confirmed transaction {}", signature);
        Ok(signature)
    }
}

fn debit(balances: &mut HashMap<Pubkey, u64>, pubkey: &Pubkey, lamports: u64) -> Result<()> {
    let balance = balances.entry(*pubkey).or_default();
    *balance = balance.checked_sub(lamports).ok_or_else(|| {
        WalletError::network(format!(
            "transaction rejected: insufficient funds in {pubkey}"
        ))
    })?;
    Ok(())
}
