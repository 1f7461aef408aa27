use dioxus::prelude::*;

use drip_common::deeplink::{Action, DeeplinkRequest, ParamSource, RawParams, UrlState};
use drip_common::wallet_backend::WalletBackend;

use super::app::Route;
use super::shared_state::use_wallet;

/// "Requested: 0.5 SUI" line for a receive link, if it carried an amount.
fn requested_line(amount: &str, currency: &str) -> Result<Option<String>, String> {
    let route = Route::Receive {
        amount: amount.to_string(),
        currency: currency.to_string(),
    };
    let url = UrlState::parse(&route.to_string()).map_err(|e| e.to_string())?;
    let raw = RawParams::from_screen(&url)
        .unwrap_or_else(|| RawParams::new(ParamSource::Query, Action::Receive.as_str()));
    match raw.validate().map_err(|e| e.to_string())? {
        DeeplinkRequest::Receive {
            amount: Some(amount),
            currency,
        } => Ok(Some(format!(
            "Requested: {amount} {}",
            currency.unwrap_or_default()
        ))),
        _ => Ok(None),
    }
}

#[component]
pub fn ReceiveView(amount: String, currency: String) -> Element {
    let wallet = use_wallet();
    let account = wallet.read().current_account();
    let requested = requested_line(&amount, &currency);

    rsx! {
        div { class: "receive-view",
            h2 { "Receive" }
            match requested {
                Ok(Some(line)) => rsx! { p { class: "requested", "{line}" } },
                Ok(None) => rsx! {},
                Err(e) => rsx! { p { class: "form-error", "Ignoring request: {e}" } },
            }
            match account {
                Some(addr) => rsx! {
                    p { "Share your address to receive SUI:" }
                    code { class: "wallet-address-full", "{addr}" }
                },
                None => rsx! {
                    p { class: "empty-state", "Connect your wallet to see your address." }
                },
            }
        }
    }
}
