use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deeplink::Action;

/// sessionStorage key for the post-action redirect marker.
pub const COMPLETION_STORAGE_KEY: &str = "deeplink-completed";

/// A marker older than this is discarded instead of acted upon.
pub const COMPLETION_WINDOW_MS: i64 = 30_000;

/// Delay between the success notice and the redirect home.
pub const REDIRECT_DELAY_MS: u32 = 2_000;

/// Left behind by a deeplink-triggered action so the destination screen can
/// send the user home once the action succeeds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCompletion {
    pub action: Action,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub should_redirect_home: bool,
}

impl ActionCompletion {
    pub fn new(action: Action, now: DateTime<Utc>) -> Self {
        Self {
            action,
            timestamp: now.timestamp_millis(),
            should_redirect_home: true,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age = now.timestamp_millis() - self.timestamp;
        (0..COMPLETION_WINDOW_MS).contains(&age)
    }

    /// Redirect only for a fresh marker, while still on an action screen.
    pub fn should_redirect(&self, path: &str, now: DateTime<Utc>) -> bool {
        self.should_redirect_home
            && self.is_fresh(now)
            && Action::from_destination_path(path).is_some()
    }

    /// Success notice shown before redirecting, e.g. `Buy completed! Redirecting to home...`.
    pub fn notice(&self) -> String {
        let action = self.action.as_str();
        let mut chars = action.chars();
        let title: String = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .into_iter()
            .chain(chars)
            .collect();
        format!("{title} completed! Redirecting to home...")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Parse a stored marker; anything unreadable is treated as absent.
    pub fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str(json).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn fresh_within_window() {
        let c = ActionCompletion::new(Action::Buy, now());
        assert!(c.is_fresh(now() + Duration::seconds(29)));
        assert!(!c.is_fresh(now() + Duration::seconds(30)));
    }

    #[test]
    fn redirects_only_from_action_screens() {
        let c = ActionCompletion::new(Action::Send, now());
        assert!(c.should_redirect("/send", now()));
        assert!(!c.should_redirect("/", now()));

        let mut quiet = c.clone();
        quiet.should_redirect_home = false;
        assert!(!quiet.should_redirect("/send", now()));
    }

    #[test]
    fn json_round_trip_and_garbage() {
        let c = ActionCompletion::new(Action::Receive, now());
        let json = c.to_json();
        assert!(json.contains("\"shouldRedirectHome\":true"));
        assert_eq!(ActionCompletion::from_json(&json), Some(c));
        assert_eq!(ActionCompletion::from_json("garbage"), None);
    }

    #[test]
    fn notice_capitalises_action() {
        let c = ActionCompletion::new(Action::Buy, now());
        assert_eq!(c.notice(), "Buy completed! Redirecting to home...");
    }
}
