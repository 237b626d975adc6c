pub mod ledger;
pub mod rpc;
pub mod sandbox;
pub mod store;
