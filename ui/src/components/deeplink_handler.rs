//! Mounts the deeplink router into the app.
//!
//! The handler renders nothing. It feeds the router the browser URL whenever
//! the route, the hash or the wallet connection changes, performs the
//! navigation it asks for and turns its outcomes into notices.

use chrono::Utc;
use dioxus::prelude::*;

use drip_common::deeplink::{Action, Navigation, UrlState};
use drip_common::router::{DeeplinkRouter, RouteOutcome};
use drip_common::wallet_backend::WalletBackend;

use super::app::Route;
use super::shared_state::{use_shared_state, use_wallet};

/// Screen route for a router navigation.
pub fn route_for(navigation: &Navigation) -> Route {
    let field = |key: &str| navigation.get(key).unwrap_or_default().to_string();
    match navigation.destination {
        Action::Buy => Route::Buy {
            package: field("package"),
            currency: field("currency"),
        },
        Action::Send => Route::Send {
            amount: field("amount"),
            currency: field("currency"),
            recipient: field("recipient"),
        },
        Action::Receive => Route::Receive {
            amount: field("amount"),
            currency: field("currency"),
        },
    }
}

/// The URL as the browser shows it. `route` is used where there is no window.
fn current_url(route: &str) -> UrlState {
    #[cfg(target_family = "wasm")]
    if let Some(location) = web_sys::window().map(|w| w.location()) {
        return UrlState::new(
            location.pathname().unwrap_or_default(),
            &location.search().unwrap_or_default(),
            &location.hash().unwrap_or_default(),
        );
    }
    UrlState::parse(route).unwrap_or_default()
}

/// Counter bumped on every `hashchange` event.
fn use_hash_changes() -> Signal<u32> {
    let changes = use_signal(|| 0u32);

    #[cfg(target_family = "wasm")]
    use_hook(move || {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let Some(window) = web_sys::window() else {
            return;
        };
        let mut changes = changes;
        let on_hash = Closure::wrap(Box::new(move |_: web_sys::HashChangeEvent| {
            *changes.write() += 1;
        }) as Box<dyn FnMut(web_sys::HashChangeEvent)>);
        if let Err(e) =
            window.add_event_listener_with_callback("hashchange", on_hash.as_ref().unchecked_ref())
        {
            tracing::warn!("hashchange listener not installed: {e:?}");
        }
        on_hash.forget();
    });

    changes
}

#[component]
pub fn DeeplinkHandler() -> Element {
    let mut shared = use_shared_state();
    let wallet = use_wallet();
    let nav = use_navigator();
    let route = use_route::<Route>();
    let hash_changes = use_hash_changes();

    let mut router = use_signal(|| DeeplinkRouter::from_config(&shared.peek().config));
    use_drop(move || router.write().reset());

    let path = route.to_string();
    let connected = wallet.read().current_account().is_some();
    let hash_version = hash_changes();
    let timeout_ms = shared.peek().config.navigation_timeout_ms;

    use_effect(use_reactive!(|(path, connected, hash_version)| {
        tracing::trace!("deeplink check #{hash_version} on {path}");
        let url = current_url(&path);

        // Landing on a destination screen completes the pending navigation.
        if Action::from_destination_path(&url.path).is_some() {
            router.write().navigation_settled();
        }

        let outcome = router.write().observe(&url, connected, Utc::now());
        if let Some(text) = outcome.notice() {
            shared.write().push_notice(text);
        }
        match outcome {
            RouteOutcome::Navigate(navigation) => {
                nav.push(route_for(&navigation));
                spawn(async move {
                    #[cfg(target_family = "wasm")]
                    gloo_timers::future::TimeoutFuture::new(timeout_ms.min(u32::MAX as u64) as u32)
                        .await;
                    #[cfg(not(target_family = "wasm"))]
                    let _ = timeout_ms;
                    router.write().release_if_stale(Utc::now());
                });
            }
            RouteOutcome::Skipped(reason) => tracing::debug!("deeplink skipped: {reason:?}"),
            RouteOutcome::Rejected(_) | RouteOutcome::ConnectWallet(_) => {}
        }
    }));

    rsx! {}
}
