use serde::{Deserialize, Serialize};
use strum::Display;

/// Main-menu choices, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    CreateWallet,
    RequestAirdrop,
    Transfer,
    ViewBalance,
    Quit,
}

impl Action {
    pub const MENU: [Action; 5] = [
        Action::CreateWallet,
        Action::RequestAirdrop,
        Action::Transfer,
        Action::ViewBalance,
        Action::Quit,
    ];

    /// Parse the operator's menu answer ("1" through "5").
    pub fn from_choice(choice: &str) -> Option<Action> {
        match choice.trim() {
            "1" => Some(Action::CreateWallet),
            "2" => Some(Action::RequestAirdrop),
            "3" => Some(Action::Transfer),
            "4" => Some(Action::ViewBalance),
            "5" => Some(Action::Quit),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::CreateWallet => "Create New Wallet",
            Action::RequestAirdrop => "Request Airdrop",
            Action::Transfer => "Send SOL to Address",
            Action::ViewBalance => "View Balance",
            Action::Quit => "Exit",
        }
    }
}
