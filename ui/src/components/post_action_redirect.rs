use chrono::Utc;
use dioxus::prelude::*;

#[cfg(target_family = "wasm")]
use drip_common::completion::COMPLETION_STORAGE_KEY;
use drip_common::completion::{ActionCompletion, REDIRECT_DELAY_MS};
use drip_common::deeplink::Action;

use super::app::Route;
use super::shared_state::{use_shared_state, SharedState};

#[cfg(target_family = "wasm")]
fn session_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.session_storage().ok().flatten()
}

/// Remember that `action` just succeeded so the screen redirects home.
pub fn mark_completed(mut shared: Signal<SharedState>, action: Action) {
    let completion = ActionCompletion::new(action, Utc::now());
    #[cfg(target_family = "wasm")]
    if let Some(storage) = session_storage() {
        if let Err(e) = storage.set_item(COMPLETION_STORAGE_KEY, &completion.to_json()) {
            tracing::warn!("could not store completion marker: {e:?}");
        }
    }
    shared.write().completion = Some(completion);
}

#[cfg(target_family = "wasm")]
fn take_stored() -> Option<ActionCompletion> {
    let storage = session_storage()?;
    let json = storage.get_item(COMPLETION_STORAGE_KEY).ok().flatten()?;
    let _ = storage.remove_item(COMPLETION_STORAGE_KEY);
    ActionCompletion::from_json(&json)
}

#[cfg(not(target_family = "wasm"))]
fn take_stored() -> Option<ActionCompletion> {
    None
}

/// Sends the user home shortly after a deeplink-triggered action completed.
///
/// Markers are single-use; a stale one is discarded silently.
#[component]
pub fn PostActionRedirect() -> Element {
    let mut shared = use_shared_state();
    let nav = use_navigator();
    let route = use_route::<Route>();

    let path = route.to_string();
    let pending = shared.read().completion.is_some();

    use_effect(use_reactive!(|(path, pending)| {
        let marker = shared.write().completion.take();
        let Some(completion) = marker.or_else(take_stored) else {
            return;
        };
        let path = path.split('?').next().unwrap_or_default().to_string();
        if !completion.should_redirect(&path, Utc::now()) {
            tracing::debug!("dropping completion marker for {} on {path}", completion.action);
            return;
        }
        tracing::trace!("completion marker picked up (pending: {pending})");
        shared.write().push_notice(completion.notice());
        spawn(async move {
            #[cfg(target_family = "wasm")]
            gloo_timers::future::TimeoutFuture::new(REDIRECT_DELAY_MS).await;
            #[cfg(not(target_family = "wasm"))]
            let _ = REDIRECT_DELAY_MS;
            nav.replace(Route::Home {});
        });
    }));

    rsx! {}
}
