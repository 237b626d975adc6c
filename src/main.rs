use std::sync::Arc;

use color_eyre::Result;
use sol_wallet::{
    app::App,
    config::Network,
    console::Console,
    domain::service::WalletService,
    infra::{ledger::LedgerClient, rpc::RpcLedger, sandbox::SandboxLedger},
};
use tracing::info;

mod cli;
mod errors;
mod logging;

#[tokio::main]
async fn main() -> Result<()> {
    errors::install_hooks()?;

    let args = cli::Args::parse_args();

    logging::init(&args.data_dir())?;

    let config = args.to_config();
    info!("Starting with config: {}", serde_json::to_string(&config)?);

    let ledger: Arc<dyn LedgerClient> = match config.network.network {
        Network::Sandbox => Arc::new(SandboxLedger::new()),
        _ => Arc::new(RpcLedger::new(&config)),
    };
    let service = WalletService::from_config(&config, ledger);

    let mut app = App::new(service, Console::stdio());

    app.run().await?;

    Ok(())
}
