//! Conversion between whole SOL amounts typed by the operator and lamports.
//!
//! Parsing goes through `rust_decimal`, so "0.1" is exactly 100_000_000 lamports.
//! Amounts finer than one lamport are rejected rather than rounded.

use std::str::FromStr;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use solana_sdk::native_token::LAMPORTS_PER_SOL;

use crate::domain::error::{Result, WalletError};

/// Number of decimal places in one SOL.
pub const SOL_DECIMALS: u32 = 9;

/// Parse operator input in whole units and convert it to lamports.
pub fn parse_sol(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(WalletError::validation("amount is empty"));
    }

    let amount = Decimal::from_str(trimmed)
        .map_err(|_| WalletError::validation(format!("'{trimmed}' is not a number")))?;

    sol_to_lamports(amount)
}

/// Convert a whole-unit amount to lamports.
pub fn sol_to_lamports(amount: Decimal) -> Result<u64> {
    if amount < Decimal::ZERO {
        return Err(WalletError::validation(format!(
            "amount must not be negative (got {amount})"
        )));
    }

    let lamports = amount
        .checked_mul(Decimal::from(LAMPORTS_PER_SOL))
        .ok_or_else(|| WalletError::validation(format!("amount {amount} is too large")))?;

    if !lamports.fract().is_zero() {
        return Err(WalletError::validation(format!(
            "amount {amount} is finer than one lamport (max {SOL_DECIMALS} decimal places)"
        )));
    }

    lamports
        .to_u64()
        .ok_or_else(|| WalletError::validation(format!("amount {amount} is too large")))
}

/// Whole SOL as lamports.
pub const fn whole_sol(sol: u64) -> u64 {
    sol.saturating_mul(LAMPORTS_PER_SOL)
}

/// Render lamports as whole units without losing precision, e.g. `1.5`.
pub fn format_sol(lamports: u64) -> String {
    Decimal::from_i128_with_scale(i128::from(lamports), SOL_DECIMALS)
        .normalize()
        .to_string()
}
