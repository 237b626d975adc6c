pub mod amount;
pub mod error;
pub mod service;
pub mod tx_builder;
pub mod wallet;
