use chrono::Utc;
use dioxus::prelude::*;

use drip_common::ledger::Direction;

use super::app::Route;
use super::ledger_state::use_ledger;

#[component]
pub fn HomeView() -> Element {
    let nav = use_navigator();

    rsx! {
        div { class: "home",
            nav { class: "actions",
                button {
                    onclick: move |_| { nav.push(Route::Buy { package: String::new(), currency: String::new() }); },
                    "Buy"
                }
                button {
                    onclick: move |_| {
                        nav.push(Route::Send {
                            amount: String::new(),
                            currency: String::new(),
                            recipient: String::new(),
                        });
                    },
                    "Send"
                }
                button {
                    onclick: move |_| { nav.push(Route::Receive { amount: String::new(), currency: String::new() }); },
                    "Receive"
                }
            }
            RecentTransactions {}
        }
    }
}

#[component]
fn RecentTransactions() -> Element {
    let ledger = use_ledger();
    let ledger = ledger.read();
    let entries = ledger.list();
    let now = Utc::now();

    rsx! {
        div { class: "recent-transactions",
            h2 { "Recent Transactions" }
            if entries.is_empty() {
                p { class: "empty-state", "No transactions yet" }
            } else {
                div { class: "tx-list",
                    {entries.iter().map(|entry| {
                        let class = match entry.direction {
                            Direction::Sent => "tx-card tx-sent",
                            Direction::Received => "tx-card tx-received",
                        };
                        let ago = entry.time_ago(now);
                        let status = entry.status.as_str();
                        rsx! {
                            div { class,
                                key: "{entry.id}",
                                div { class: "tx-header",
                                    span { class: "tx-description", "{entry.description}" }
                                    span { class: "tx-amount", "{entry.amount}" }
                                }
                                div { class: "tx-meta",
                                    span { class: "tx-status", "{status}" }
                                    span { class: "tx-time", " · {ago}" }
                                }
                            }
                        }
                    })}
                }
            }
        }
    }
}
