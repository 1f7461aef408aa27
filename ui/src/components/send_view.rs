use dioxus::prelude::*;

use drip_common::currency::Currency;
use drip_common::deeplink::{Action, ParamSource, RawParams};

use super::ledger_state::{perform_action, use_ledger};
use super::post_action_redirect::mark_completed;
use super::shared_state::{use_shared_state, use_wallet};

fn non_empty(s: String) -> Option<String> {
    let s = s.trim().to_string();
    (!s.is_empty()).then_some(s)
}

#[component]
pub fn SendView(amount: String, currency: String, recipient: String) -> Element {
    let shared = use_shared_state();
    let wallet = use_wallet();
    let ledger = use_ledger();

    let initial_currency = currency.parse::<Currency>().unwrap_or_default();
    let mut amount = use_signal(|| amount);
    let mut recipient = use_signal(|| recipient);
    let mut send_currency = use_signal(|| initial_currency);
    let mut error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let busy = submitting();
    let code = send_currency().code();

    rsx! {
        div { class: "send-view",
            h2 { "Send" }
            div { class: "form-group",
                label { "Amount:" }
                input {
                    r#type: "text",
                    inputmode: "decimal",
                    value: "{amount}",
                    oninput: move |evt| amount.set(evt.value()),
                }
                select {
                    value: "{code}",
                    onchange: move |evt| {
                        if let Ok(c) = evt.value().parse::<Currency>() {
                            send_currency.set(c);
                        }
                    },
                    {Currency::all().iter().map(|c| rsx! {
                        option { key: "{c}", value: "{c}", "{c}" }
                    })}
                }
            }
            div { class: "form-group",
                label { "Recipient:" }
                input {
                    r#type: "text",
                    placeholder: "0x...",
                    value: "{recipient}",
                    oninput: move |evt| recipient.set(evt.value()),
                }
            }
            if let Some(msg) = error() {
                p { class: "form-error", "{msg}" }
            }
            button {
                class: "primary",
                disabled: busy,
                onclick: move |_| {
                    let mut raw = RawParams::new(ParamSource::Query, Action::Send.as_str());
                    raw.amount = non_empty(amount());
                    raw.currency = Some(send_currency().code().to_string());
                    raw.recipient = non_empty(recipient());
                    let request = match raw.validate() {
                        Ok(r) => r,
                        Err(e) => {
                            error.set(Some(e.to_string()));
                            return;
                        }
                    };
                    error.set(None);
                    submitting.set(true);
                    spawn(async move {
                        if perform_action(shared, wallet, ledger, request).await {
                            mark_completed(shared, Action::Send);
                        }
                        submitting.set(false);
                    });
                },
                if busy { "Sending..." } else { "Send" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" 0.5 ".into()).as_deref(), Some("0.5"));
    }
}
