use dioxus::prelude::*;

use drip_common::completion::ActionCompletion;
use drip_common::config::WalletConfig;
use drip_common::wallet_backend::MockWallet;

/// A transient message shown above the current screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u32,
    pub text: String,
}

/// Session state shared across all components.
#[derive(Clone, Debug, Default)]
pub struct SharedState {
    pub config: WalletConfig,
    pub notices: Vec<Notice>,
    /// Set when a screen finished its action and wants to go home.
    pub completion: Option<ActionCompletion>,
    next_notice_id: u32,
}

impl SharedState {
    pub fn new(config: WalletConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.next_notice_id += 1;
        self.notices.push(Notice {
            id: self.next_notice_id,
            text: text.into(),
        });
    }

    pub fn dismiss(&mut self, id: u32) {
        self.notices.retain(|n| n.id != id);
    }
}

pub fn use_shared_state() -> Signal<SharedState> {
    use_context::<Signal<SharedState>>()
}

/// The wallet-connection provider. Only the mock backend ships with the UI.
pub fn use_wallet() -> Signal<MockWallet> {
    use_context::<Signal<MockWallet>>()
}
