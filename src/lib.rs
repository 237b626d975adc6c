//! sol-wallet - an interactive single-keypair wallet for Solana.
//!
//! This library provides:
//! - Key storage for the wallet record
//! - Transfer building and signing
//! - Wallet operations against a remote (or in-memory) ledger
//! - The interactive command loop

pub mod action;
pub mod app;
pub mod config;
pub mod console;
pub mod domain;
pub mod infra;
