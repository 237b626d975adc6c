use std::io::Write;

use color_eyre::eyre::Result;
use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::{
    action::Action,
    console::Console,
    domain::{
        amount::{format_sol, parse_sol, whole_sol},
        error::WalletError,
        service::WalletService,
        tx_builder::{Destination, parse_destination},
    },
    infra::store::LoadOutcome,
};

/// Airdrop size for menu option 2, in lamports.
pub const AIRDROP_LAMPORTS: u64 = whole_sol(1);

/// A transfer whose destination and amount have both been collected.
#[derive(Debug)]
pub struct TransferRequest {
    pub destination: Destination,
    pub lamports: u64,
}

/// Where the command loop is.
#[derive(Debug)]
pub enum State {
    MainMenu,
    AwaitDestination,
    AwaitAmount { destination: Destination },
    Executing(TransferRequest),
    Terminated,
}

impl State {
    pub fn name(&self) -> &'static str {
        match self {
            State::MainMenu => "main_menu",
            State::AwaitDestination => "await_destination",
            State::AwaitAmount { .. } => "await_amount",
            State::Executing(_) => "executing",
            State::Terminated => "terminated",
        }
    }
}

/// Interactive menu driving a `WalletService`.
///
/// Strictly sequential: each operation settles before the next prompt is shown.
pub struct App<R, W> {
    service: WalletService,
    console: Console<R, W>,
    state: State,
}

impl<R: AsyncRead + Unpin, W: Write> App<R, W> {
    pub fn new(service: WalletService, console: Console<R, W>) -> Self {
        Self {
            service,
            console,
            state: State::MainMenu,
        }
    }

    pub fn service(&self) -> &WalletService {
        &self.service
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn console(&self) -> &Console<R, W> {
        &self.console
    }

    pub async fn run(&mut self) -> Result<()> {
        self.open_wallet().await?;

        loop {
            let state = std::mem::replace(&mut self.state, State::Terminated);
            if matches!(state, State::Terminated) {
                break;
            }
            self.state = self.step(state).await?;
        }

        info!("Command loop terminated");
        Ok(())
    }

    /// Advance the state machine by one transition.
    pub async fn step(&mut self, state: State) -> Result<State> {
        let next = match state {
            State::MainMenu => self.main_menu().await?,
            State::AwaitDestination => {
                let Some(input) = self.console.prompt("Enter destination address: ").await?
                else {
                    return Ok(State::Terminated);
                };
                match parse_destination(&input) {
                    Ok(destination) => State::AwaitAmount { destination },
                    Err(e) => {
                        self.report("reading destination", &e)?;
                        State::MainMenu
                    }
                }
            }
            State::AwaitAmount { destination } => {
                let Some(input) = self.console.prompt("Enter amount to send (SOL): ").await?
                else {
                    return Ok(State::Terminated);
                };
                match parse_sol(&input) {
                    Ok(lamports) => State::Executing(TransferRequest {
                        destination,
                        lamports,
                    }),
                    Err(e) => {
                        self.report("reading amount", &e)?;
                        State::MainMenu
                    }
                }
            }
            State::Executing(request) => {
                if !self.transfer(request).await? {
                    self.view_balance().await?;
                }
                State::MainMenu
            }
            State::Terminated => State::Terminated,
        };
        debug!("Command loop moved to {}", next.name());
        Ok(next)
    }

    async fn main_menu(&mut self) -> Result<State> {
        self.console.say("")?;
        self.console.say("Main Menu:")?;
        for (i, action) in Action::MENU.iter().enumerate() {
            self.console.say(format!("{}. {}", i + 1, action.label()))?;
        }

        let Some(choice) = self.console.prompt("Choose an option (1-5): ").await? else {
            return Ok(State::Terminated);
        };

        let Some(action) = Action::from_choice(&choice) else {
            self.console
                .say("Invalid choice. Please choose a valid option.")?;
            return Ok(State::MainMenu);
        };
        debug!("Selected action: {}", action);

        Ok(match action {
            Action::CreateWallet => {
                self.create_wallet().await?;
                State::MainMenu
            }
            Action::RequestAirdrop => {
                self.request_airdrop().await?;
                State::MainMenu
            }
            Action::Transfer => State::AwaitDestination,
            Action::ViewBalance => {
                self.view_balance().await?;
                State::MainMenu
            }
            Action::Quit => {
                self.console.say("Goodbye.")?;
                State::Terminated
            }
        })
    }

    async fn open_wallet(&mut self) -> Result<()> {
        self.console.say(format!(
            "Connected to {}",
            self.service.ledger_endpoint()
        ))?;

        match self.service.open().await {
            Ok(outcome) => {
                let pubkey = self
                    .service
                    .pubkey()
                    .await
                    .map(|p| p.to_string())
                    .unwrap_or_default();
                match outcome {
                    LoadOutcome::Loaded => self.console.say(format!("Wallet: {pubkey}"))?,
                    LoadOutcome::CreatedFresh => {
                        self.console.say(format!("Created new wallet: {pubkey}"))?
                    }
                    LoadOutcome::RecoveredFromCorrupt { backup } => {
                        self.console.say(format!(
                            "Warning: the stored wallet was unusable and was moved to {}",
                            backup.display()
                        ))?;
                        self.console.say(format!("Created new wallet: {pubkey}"))?;
                    }
                }
            }
            Err(e) => {
                self.report("loading wallet", &e)?;
                self.console.say(
                    "Wallet features are disabled until a new wallet is created (option 1).",
                )?;
            }
        }
        Ok(())
    }

    async fn create_wallet(&mut self) -> Result<()> {
        match self.service.create_wallet().await {
            Ok(pubkey) => {
                self.console.say(format!("New wallet created: {pubkey}"))?;
                self.console
                    .say("The previous wallet key has been discarded.")?;
            }
            Err(e) => self.report("creating wallet", &e)?,
        }
        Ok(())
    }

    async fn request_airdrop(&mut self) -> Result<()> {
        match self.service.request_airdrop(AIRDROP_LAMPORTS).await {
            Ok(signature) => self.console.say(format!(
                "Airdrop requested: {} SOL (signature {signature})",
                format_sol(AIRDROP_LAMPORTS)
            ))?,
            Err(e) => self.report("requesting airdrop", &e)?,
        }
        Ok(())
    }

    /// Returns whether the post-transfer balance was already shown.
    async fn transfer(&mut self, request: TransferRequest) -> Result<bool> {
        let TransferRequest {
            destination,
            lamports,
        } = request;
        match self.service.transfer(destination, lamports).await {
            Ok(receipt) => {
                self.console.say(format!(
                    "Transfer successful! Sent {} SOL to {}. Transaction signature: {}",
                    format_sol(receipt.lamports),
                    receipt.destination,
                    receipt.signature
                ))?;
                if let Some(lamports) = receipt.balance_after {
                    self.console
                        .say(format!("Current balance: {} SOL", format_sol(lamports)))?;
                    return Ok(true);
                }
            }
            Err(e) => self.report("transferring SOL", &e)?,
        }
        Ok(false)
    }

    async fn view_balance(&mut self) -> Result<()> {
        match self.service.balance().await {
            Ok(lamports) => self
                .console
                .say(format!("Current balance: {} SOL", format_sol(lamports)))?,
            Err(e) => self.report("getting wallet balance", &e)?,
        }
        Ok(())
    }

    fn report(&mut self, context: &str, error: &WalletError) -> Result<()> {
        info!("Error {}: {}", context, error);
        self.console.say(format!("Error {context}: {error}"))?;
        Ok(())
    }
}
