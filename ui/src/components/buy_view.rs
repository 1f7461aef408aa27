use dioxus::prelude::*;

use drip_common::currency::Currency;
use drip_common::deeplink::{Action, DeeplinkRequest};
use drip_common::product::Package;

use super::ledger_state::{perform_action, use_ledger};
use super::post_action_redirect::mark_completed;
use super::shared_state::{use_shared_state, use_wallet};

#[component]
pub fn BuyView(package: String, currency: String) -> Element {
    let shared = use_shared_state();
    let wallet = use_wallet();
    let ledger = use_ledger();

    // Pre-fill from the URL; unknown values fall back to the first choice.
    let initial_package = package.parse::<Package>().unwrap_or(Package::Ml100);
    let initial_currency = currency.parse::<Currency>().unwrap_or_default();
    let mut selected = use_signal(|| initial_package);
    let mut pay_with = use_signal(|| initial_currency);
    let mut submitting = use_signal(|| false);

    let code = pay_with().code();
    let price = selected().price(pay_with());
    let busy = submitting();

    rsx! {
        div { class: "buy-view",
            h2 { "Buy Water" }
            div { class: "package-options",
                {Package::all().iter().map(|&p| {
                    let class = if p == selected() { "package selected" } else { "package" };
                    rsx! {
                        button { class,
                            key: "{p}",
                            onclick: move |_| selected.set(p),
                            "{p}"
                        }
                    }
                })}
            }
            div { class: "form-group",
                label { "Pay with:" }
                select {
                    value: "{code}",
                    onchange: move |evt| {
                        if let Ok(c) = evt.value().parse::<Currency>() {
                            pay_with.set(c);
                        }
                    },
                    {Currency::all().iter().map(|c| {
                        let label = c.label();
                        rsx! {
                            option { key: "{c}", value: "{c}", "{label}" }
                        }
                    })}
                }
            }
            p { class: "price", "Price: {price} {code}" }
            button {
                class: "primary",
                disabled: busy,
                onclick: move |_| {
                    let request = DeeplinkRequest::Buy {
                        package: selected(),
                        currency: pay_with(),
                    };
                    submitting.set(true);
                    spawn(async move {
                        if perform_action(shared, wallet, ledger, request).await {
                            mark_completed(shared, Action::Buy);
                        }
                        submitting.set(false);
                    });
                },
                if busy { "Processing..." } else { "Buy" }
            }
        }
    }
}
