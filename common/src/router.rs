//! Deeplink router state machine.
//!
//! The router is owned by whoever observes the URL (a Dioxus signal in the UI,
//! a local in the CLI). It never panics and never returns errors: each call to
//! [`DeeplinkRouter::observe`] yields a [`RouteOutcome`] describing at most one
//! navigation or one notice.
//!
//! ```text
//!            observe()                   valid + connected
//!   Idle ──────────────► Parsing ─────────────────────────► Navigating
//!    ▲                     │  │                                  │
//!    │   rejected / dup    │  │ valid, no wallet                 │ settled / timeout
//!    └─────────────────────┘  ▼                                  │
//!    ▲              AwaitingConnection ── wallet connects ──► Idle
//!    └───────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};

use crate::config::{WalletConfig, DEFAULT_NAVIGATION_TIMEOUT_MS};
use crate::deeplink::{
    Action, DeeplinkError, DeeplinkRequest, Fingerprint, Navigation, RawParams, UrlState,
};

#[derive(Clone, Debug, PartialEq)]
pub enum RouterState {
    Idle,
    /// Transient while a URL is being examined inside `observe`.
    Parsing,
    /// A valid request is parked until a wallet connects.
    AwaitingConnection { request: DeeplinkRequest },
    /// A navigation was dispatched and has not settled yet.
    Navigating {
        destination: Action,
        since: DateTime<Utc>,
    },
}

/// Why `observe` did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The URL carries no deeplink.
    NoRequest,
    /// Already on a destination screen; its own URL is not a fresh request.
    OnDestination(Action),
    /// This exact request was already acted upon.
    Duplicate,
    /// A navigation is still in flight; the request is dropped.
    Busy,
    /// Same request as the one already waiting for a wallet.
    AwaitingConnection,
}

/// Result of one router observation.
#[derive(Clone, Debug, PartialEq)]
pub enum RouteOutcome {
    Navigate(Navigation),
    Rejected(DeeplinkError),
    ConnectWallet(DeeplinkRequest),
    Skipped(SkipReason),
}

impl RouteOutcome {
    /// Text to show the user, if this outcome warrants a notice.
    pub fn notice(&self) -> Option<String> {
        match self {
            RouteOutcome::Rejected(err) => Some(format!("Invalid link: {err}")),
            RouteOutcome::ConnectWallet(request) => Some(format!(
                "Please connect your wallet first to {}",
                request.action()
            )),
            RouteOutcome::Navigate(_) | RouteOutcome::Skipped(_) => None,
        }
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            RouteOutcome::Navigate(nav) => Some(nav),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct DeeplinkRouter {
    state: RouterState,
    processed: HashSet<Fingerprint>,
    last_hash: Option<String>,
    was_connected: bool,
    navigation_timeout: Duration,
}

impl Default for DeeplinkRouter {
    fn default() -> Self {
        Self::new(Duration::milliseconds(DEFAULT_NAVIGATION_TIMEOUT_MS as i64))
    }
}

impl DeeplinkRouter {
    pub fn new(navigation_timeout: Duration) -> Self {
        Self {
            state: RouterState::Idle,
            processed: HashSet::new(),
            last_hash: None,
            was_connected: false,
            navigation_timeout,
        }
    }

    pub fn from_config(config: &WalletConfig) -> Self {
        Self::new(config.navigation_timeout())
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn is_processed(&self, fingerprint: &Fingerprint) -> bool {
        self.processed.contains(fingerprint)
    }

    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn is_navigating(&self) -> bool {
        matches!(self.state, RouterState::Navigating { .. })
    }

    /// Examine the current URL and decide what, if anything, to do.
    pub fn observe(&mut self, url: &UrlState, connected: bool, now: DateTime<Utc>) -> RouteOutcome {
        self.note_connection(connected);
        self.note_hash(&url.hash);
        self.release_if_stale(now);

        if self.is_navigating() {
            tracing::debug!("deeplink dropped, navigation in flight");
            return RouteOutcome::Skipped(SkipReason::Busy);
        }

        if let Some(screen) = Action::from_destination_path(&url.path) {
            return RouteOutcome::Skipped(SkipReason::OnDestination(screen));
        }

        let previous = std::mem::replace(&mut self.state, RouterState::Parsing);
        let outcome = self.dispatch(url, connected, now, previous);
        if self.state == RouterState::Parsing {
            self.state = RouterState::Idle;
        }
        outcome
    }

    fn dispatch(
        &mut self,
        url: &UrlState,
        connected: bool,
        now: DateTime<Utc>,
        previous: RouterState,
    ) -> RouteOutcome {
        let Some(raw) = RawParams::extract(url) else {
            return RouteOutcome::Skipped(SkipReason::NoRequest);
        };

        let request = match raw.validate() {
            Ok(request) => request,
            Err(err) => {
                tracing::info!("deeplink rejected ({:?} source): {err}", raw.source);
                return RouteOutcome::Rejected(err);
            }
        };

        let fingerprint = request.fingerprint();
        if self.processed.contains(&fingerprint) {
            tracing::debug!("deeplink {} already handled", fingerprint.as_str());
            return RouteOutcome::Skipped(SkipReason::Duplicate);
        }

        if !connected {
            let repeat = matches!(
                &previous,
                RouterState::AwaitingConnection { request: parked } if parked.fingerprint() == fingerprint
            );
            self.state = RouterState::AwaitingConnection {
                request: request.clone(),
            };
            if repeat {
                return RouteOutcome::Skipped(SkipReason::AwaitingConnection);
            }
            tracing::info!("deeplink {} waiting for wallet connection", request.action());
            return RouteOutcome::ConnectWallet(request);
        }

        // Recorded before the navigation is handed out so a re-render caused by
        // the navigation itself sees it as handled.
        self.processed.insert(fingerprint);
        let navigation = request.navigation();
        self.state = RouterState::Navigating {
            destination: navigation.destination,
            since: now,
        };
        tracing::info!("deeplink navigating to {navigation}");
        RouteOutcome::Navigate(navigation)
    }

    /// The host finished the navigation handed out by `observe`.
    pub fn navigation_settled(&mut self) {
        if self.is_navigating() {
            self.state = RouterState::Idle;
        }
    }

    /// Force-clear a navigation that has been in flight longer than the timeout.
    /// Returns true if the flag was cleared.
    pub fn release_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        if let RouterState::Navigating { since, destination } = self.state {
            if now - since >= self.navigation_timeout {
                tracing::warn!("navigation to {} never settled, releasing", destination.path());
                self.state = RouterState::Idle;
                return true;
            }
        }
        false
    }

    /// Report the wallet connection state. A disconnected-to-connected edge
    /// clears the processed set so parked requests can run. Returns true when
    /// the host should observe the URL again.
    pub fn note_connection(&mut self, connected: bool) -> bool {
        let connected_now = connected && !self.was_connected;
        self.was_connected = connected;
        if !connected_now {
            return false;
        }
        self.processed.clear();
        if matches!(self.state, RouterState::AwaitingConnection { .. }) {
            self.state = RouterState::Idle;
            return true;
        }
        false
    }

    fn note_hash(&mut self, hash: &str) {
        if self.last_hash.as_deref() == Some(hash) {
            return;
        }
        if self.last_hash.is_some() {
            tracing::debug!("hash changed, clearing {} processed deeplinks", self.processed.len());
            self.processed.clear();
        }
        self.last_hash = Some(hash.to_string());
    }

    /// Drop all state, as on unmount.
    pub fn reset(&mut self) {
        self.state = RouterState::Idle;
        self.processed.clear();
        self.last_hash = None;
        self.was_connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::Currency;
    use crate::product::Package;

    const SEND_HASH: &str = "action=send&amount=0.5&currency=sui&recipient=0xabc123";

    fn t(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    fn home(hash: &str) -> UrlState {
        UrlState::new("/", "", hash)
    }

    #[test]
    fn send_via_hash_navigates_with_normalised_currency() {
        let mut router = DeeplinkRouter::default();
        let outcome = router.observe(&home(SEND_HASH), true, t(0));
        let nav = outcome.navigation().unwrap();
        assert_eq!(nav.to_url(), "/send?amount=0.5&currency=SUI&recipient=0xabc123");
        assert!(router.is_navigating());
        assert_eq!(router.processed_count(), 1);
    }

    #[test]
    fn buy_navigation_has_exactly_package_and_currency() {
        for package in Package::all() {
            for currency in Currency::all() {
                let mut router = DeeplinkRouter::default();
                let query = format!("action=buy&package={package}&currency={currency}&amount=3");
                let url = UrlState::new("/", &query, "");
                let nav = router.observe(&url, true, t(0)).navigation().cloned().unwrap();
                assert_eq!(nav.destination, Action::Buy);
                assert_eq!(nav.params.len(), 2);
                assert_eq!(nav.get("package"), Some(package.code()));
                assert_eq!(nav.get("currency"), Some(currency.code()));
            }
        }
    }

    #[test]
    fn repeat_while_in_flight_is_dropped() {
        let mut router = DeeplinkRouter::default();
        assert!(router.observe(&home(SEND_HASH), true, t(0)).navigation().is_some());
        assert_eq!(
            router.observe(&home(SEND_HASH), true, t(10)),
            RouteOutcome::Skipped(SkipReason::Busy)
        );
    }

    #[test]
    fn repeat_after_settle_is_duplicate() {
        let mut router = DeeplinkRouter::default();
        router.observe(&home(SEND_HASH), true, t(0));
        router.navigation_settled();
        assert_eq!(router.state(), &RouterState::Idle);
        assert_eq!(
            router.observe(&home(SEND_HASH), true, t(10)),
            RouteOutcome::Skipped(SkipReason::Duplicate)
        );
    }

    #[test]
    fn changed_field_is_a_new_request() {
        let mut router = DeeplinkRouter::default();
        let first = UrlState::new("/", "action=send&amount=1&currency=SUI&recipient=0xabc", "");
        let second = UrlState::new("/", "action=send&amount=2&currency=SUI&recipient=0xabc", "");
        assert!(router.observe(&first, true, t(0)).navigation().is_some());
        router.navigation_settled();
        assert!(router.observe(&second, true, t(5)).navigation().is_some());
        assert_eq!(router.processed_count(), 2);
    }

    #[test]
    fn incomplete_request_is_not_recorded() {
        let mut router = DeeplinkRouter::default();
        let url = home("action=send&amount=1&currency=SUI");
        let outcome = router.observe(&url, true, t(0));
        assert!(matches!(
            outcome,
            RouteOutcome::Rejected(DeeplinkError::MissingField { field: "recipient", .. })
        ));
        assert!(outcome.notice().is_some());
        assert_eq!(router.processed_count(), 0);
        assert_eq!(router.state(), &RouterState::Idle);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let mut router = DeeplinkRouter::default();
        let outcome = router.observe(&home("action=swap"), true, t(0));
        assert_eq!(
            outcome,
            RouteOutcome::Rejected(DeeplinkError::UnknownAction("swap".into()))
        );
    }

    #[test]
    fn plain_page_is_not_a_request() {
        let mut router = DeeplinkRouter::default();
        assert_eq!(
            router.observe(&home(""), true, t(0)),
            RouteOutcome::Skipped(SkipReason::NoRequest)
        );
    }

    #[test]
    fn destination_screen_is_left_alone() {
        let mut router = DeeplinkRouter::default();
        let url = UrlState::new("/send", "action=send&amount=1&currency=SUI&recipient=0xabc", "");
        assert_eq!(
            router.observe(&url, true, t(0)),
            RouteOutcome::Skipped(SkipReason::OnDestination(Action::Send))
        );
        assert_eq!(router.processed_count(), 0);
    }

    #[test]
    fn disconnected_request_waits_then_retries() {
        let mut router = DeeplinkRouter::default();
        let url = home(SEND_HASH);

        let outcome = router.observe(&url, false, t(0));
        assert!(matches!(outcome, RouteOutcome::ConnectWallet(_)));
        assert!(outcome.notice().unwrap().contains("connect your wallet"));
        assert_eq!(router.processed_count(), 0);
        assert!(matches!(router.state(), RouterState::AwaitingConnection { .. }));

        // Re-rendering while still disconnected does not repeat the notice.
        assert_eq!(
            router.observe(&url, false, t(5)),
            RouteOutcome::Skipped(SkipReason::AwaitingConnection)
        );

        assert!(router.note_connection(true));
        assert_eq!(router.state(), &RouterState::Idle);
        assert!(router.observe(&url, true, t(10)).navigation().is_some());
    }

    #[test]
    fn connect_edge_clears_processed() {
        let mut router = DeeplinkRouter::default();
        router.observe(&home(SEND_HASH), true, t(0));
        router.navigation_settled();
        router.note_connection(false);
        assert_eq!(router.processed_count(), 1);
        router.note_connection(true);
        assert_eq!(router.processed_count(), 0);
    }

    #[test]
    fn hash_change_clears_processed() {
        let mut router = DeeplinkRouter::default();
        router.observe(&home(SEND_HASH), true, t(0));
        router.navigation_settled();
        router.observe(&home(""), true, t(5));
        assert_eq!(router.processed_count(), 0);
        assert!(router.observe(&home(SEND_HASH), true, t(10)).navigation().is_some());
    }

    #[test]
    fn stale_navigation_is_force_released() {
        let mut router = DeeplinkRouter::new(Duration::milliseconds(1000));
        router.observe(&home(SEND_HASH), true, t(0));
        assert!(!router.release_if_stale(t(999)));
        assert!(router.is_navigating());
        assert!(router.release_if_stale(t(1000)));
        assert_eq!(router.state(), &RouterState::Idle);
    }

    #[test]
    fn new_request_after_timeout_goes_through() {
        let mut router = DeeplinkRouter::new(Duration::milliseconds(1000));
        router.observe(&UrlState::new("/", "action=receive", ""), true, t(0));
        let outcome = router.observe(&UrlState::new("/", "action=receive&currency=ngn", ""), true, t(1500));
        assert_eq!(
            outcome.navigation().map(Navigation::to_url).as_deref(),
            Some("/receive?currency=NGN")
        );
    }

    #[test]
    fn receive_with_unknown_currency_still_navigates() {
        let mut router = DeeplinkRouter::default();
        let outcome = router.observe(&home("action=receive&currency=usd"), true, t(0));
        assert_eq!(
            outcome.navigation().map(Navigation::to_url).as_deref(),
            Some("/receive")
        );

        let mut router = DeeplinkRouter::default();
        let outcome = router.observe(&home("action=receive&amount=abc&currency=sui"), true, t(0));
        assert_eq!(
            outcome.navigation().map(Navigation::to_url).as_deref(),
            Some("/receive?currency=SUI")
        );
    }

    #[test]
    fn reset_forgets_everything() {
        let mut router = DeeplinkRouter::default();
        router.observe(&home(SEND_HASH), true, t(0));
        router.reset();
        assert_eq!(router.state(), &RouterState::Idle);
        assert_eq!(router.processed_count(), 0);
        assert!(router.observe(&home(SEND_HASH), true, t(1)).navigation().is_some());
    }

    #[test]
    fn structured_path_navigates() {
        let mut router = DeeplinkRouter::default();
        let url = UrlState::parse("/deeplink/buy/200ml/ngn").unwrap();
        let outcome = router.observe(&url, true, t(0));
        assert_eq!(
            outcome.navigation().map(Navigation::to_url).as_deref(),
            Some("/buy?package=200ml&currency=NGN")
        );
    }
}
