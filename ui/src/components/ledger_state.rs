use dioxus::prelude::*;

use drip_common::deeplink::DeeplinkRequest;
use drip_common::ledger::Ledger;
use drip_common::wallet_backend::{execute_request, record_success, MockWallet};

use super::local_store::LocalStorageStore;
use super::shared_state::SharedState;

pub type BrowserLedger = Ledger<LocalStorageStore>;

pub fn open_ledger(storage_key: &str) -> BrowserLedger {
    let ledger = Ledger::open(LocalStorageStore::new(storage_key));
    tracing::info!("ledger {}: {} entries", ledger.store().key(), ledger.len());
    ledger
}

pub fn use_ledger() -> Signal<BrowserLedger> {
    use_context::<Signal<BrowserLedger>>()
}

/// Execute `request` with the connected wallet and record it on success.
///
/// Returns whether the action went through. Failures become notices.
pub async fn perform_action(
    mut shared: Signal<SharedState>,
    mut wallet: Signal<MockWallet>,
    mut ledger: Signal<BrowserLedger>,
    request: DeeplinkRequest,
) -> bool {
    // Work on a copy so no signal borrow is held across the await.
    let mut backend = wallet.peek().clone();
    let result = execute_request(&mut backend, &request).await;
    // The account may have changed while the transaction was in flight.
    wallet.write().absorb_activity(backend);

    match result {
        Ok(receipt) => {
            record_success(&mut *ledger.write(), &request);
            if !ledger.peek().is_persisted() {
                shared
                    .write()
                    .push_notice("Saved for this session only: browser storage is unavailable");
            }
            if let Some(receipt) = receipt {
                tracing::info!("{} confirmed: {}", request.action(), receipt.digest);
            }
            true
        }
        Err(e) => {
            shared.write().push_notice(format!("Transaction failed: {e}"));
            false
        }
    }
}
