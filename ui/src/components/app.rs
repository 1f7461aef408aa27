use dioxus::prelude::*;

use drip_common::config::WalletConfig;
use drip_common::wallet::shorten;
use drip_common::wallet_backend::{MockWallet, WalletBackend};

use super::buy_view::BuyView;
use super::deeplink_handler::DeeplinkHandler;
use super::home_view::HomeView;
use super::ledger_state::open_ledger;
use super::post_action_redirect::PostActionRedirect;
use super::receive_view::ReceiveView;
use super::send_view::SendView;
use super::shared_state::{use_shared_state, use_wallet, SharedState};

/// Address the development wallet connects as.
const DEV_ACCOUNT: &str = "0x5d1b6a3c9e2f40718b9ad4c6e03f7a21c8b4e9d05f6a7b3c2d1e0f9a8b7c6d5e";

#[derive(Clone, Debug, PartialEq, Routable)]
pub enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Home {},
    #[route("/buy?:package&:currency")]
    Buy { package: String, currency: String },
    #[route("/send?:amount&:currency&:recipient")]
    Send {
        amount: String,
        currency: String,
        recipient: String,
    },
    #[route("/receive?:amount&:currency")]
    Receive { amount: String, currency: String },
    /// Structured links such as `/send/0.5/SUI/0x..` or `/deeplink/buy/100ml/NGN`.
    #[route("/:..segments")]
    Fallback { segments: Vec<String> },
}

#[component]
pub fn App() -> Element {
    // The browser has no process environment; defaults apply there.
    let config = WalletConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("{e}, using defaults");
        WalletConfig::default()
    });
    let storage_key = config.storage_key.clone();
    use_context_provider(|| Signal::new(SharedState::new(config)));
    use_context_provider(|| Signal::new(MockWallet::disconnected()));
    use_context_provider(|| Signal::new(open_ledger(&storage_key)));

    rsx! { Router::<Route> {} }
}

#[component]
fn AppLayout() -> Element {
    let mut shared = use_shared_state();
    let mut wallet = use_wallet();
    let nav = use_navigator();

    let account = wallet.read().current_account().map(|a| shorten(&a));
    let notices = shared.read().notices.clone();

    rsx! {
        div { class: "drip-app",
            header { class: "app-header",
                div { class: "header-top",
                    h1 {
                        onclick: move |_| { nav.push(Route::Home {}); },
                        "drip"
                    }
                    match account {
                        Some(short) => rsx! {
                            div { class: "wallet-info",
                                span { class: "wallet-address", "{short}" }
                                button {
                                    onclick: move |_| wallet.write().disconnect(),
                                    "Disconnect"
                                }
                            }
                        },
                        None => rsx! {
                            button {
                                class: "connect-button",
                                onclick: move |_| wallet.write().connect(DEV_ACCOUNT),
                                "Connect Wallet"
                            }
                        },
                    }
                }
            }
            DeeplinkHandler {}
            PostActionRedirect {}
            if !notices.is_empty() {
                div { class: "notices",
                    {notices.into_iter().map(|notice| {
                        let id = notice.id;
                        rsx! {
                            div { class: "notice",
                                key: "{id}",
                                span { "{notice.text}" }
                                button {
                                    onclick: move |_| shared.write().dismiss(id),
                                    "×"
                                }
                            }
                        }
                    })}
                }
            }
            main {
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Home() -> Element {
    rsx! { HomeView {} }
}

/// Shows home while the deeplink handler routes the path.
#[component]
fn Fallback(segments: Vec<String>) -> Element {
    tracing::debug!("unmatched path /{}", segments.join("/"));
    rsx! { HomeView {} }
}

#[component]
fn Buy(package: String, currency: String) -> Element {
    rsx! { BuyView { package, currency } }
}

#[component]
fn Send(amount: String, currency: String, recipient: String) -> Element {
    rsx! { SendView { amount, currency, recipient } }
}

#[component]
fn Receive(amount: String, currency: String) -> Element {
    rsx! { ReceiveView { amount, currency } }
}
