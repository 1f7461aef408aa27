//! Local transaction ledger.
//!
//! An append-only, newest-first record of actions started from this client.
//! It is keyed to the device (browser profile or data directory), not to a
//! wallet address, so switching accounts shares one log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Currency label used when the caller does not name one.
pub const DEFAULT_CURRENCY: &str = "SUI";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

impl Direction {
    pub fn sign(&self) -> char {
        match self {
            Direction::Sent => '-',
            Direction::Received => '+',
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sent" => Ok(Direction::Sent),
            "received" => Ok(Direction::Received),
            other => Err(format!("unknown direction: {other}")),
        }
    }
}

/// Only `Completed` is ever written by this client; the others must still
/// survive a load/save cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Completed,
    Pending,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Completed => "completed",
            TxStatus::Pending => "pending",
            TxStatus::Failed => "failed",
        }
    }
}

/// One ledger row, persisted as a camelCase JSON object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEntry {
    pub id: i64,
    pub direction: Direction,
    /// Signed display amount, e.g. `-0.1 SUI`.
    pub amount: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub description: String,
    pub status: TxStatus,
    /// Epoch milliseconds.
    pub created_at: i64,
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

impl TransactionEntry {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        format_time_ago(self.created_at, now)
    }
}

/// Render `magnitude` with the sign of `direction`, ignoring its own sign.
pub fn format_signed_amount(direction: Direction, magnitude: f64, currency: &str) -> String {
    format!("{}{} {}", direction.sign(), magnitude.abs(), currency)
}

/// Coarse relative time: `Just now`, `5m ago`, `3h ago`, `2d ago`.
pub fn format_time_ago(created_at_ms: i64, now: DateTime<Utc>) -> String {
    let diff = now.timestamp_millis().saturating_sub(created_at_ms).max(0);
    let minutes = diff / 60_000;
    let hours = diff / 3_600_000;
    let days = diff / 86_400_000;
    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{days}d ago")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("amount must be a finite number, got {0}")]
    NonFiniteAmount(f64),
    #[error("persisted ledger is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Durable backing for the ledger: browser localStorage, a file, or memory.
pub trait LedgerStore {
    /// The persisted JSON array, or `None` if nothing was ever written.
    fn load(&self) -> Result<Option<String>, StoreError>;
    fn save(&mut self, json: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory store. Optionally fails every write, to model a full or blocked storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Option<String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(json: impl Into<String>) -> Self {
        Self {
            data: Some(json.into()),
            fail_writes: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            data: None,
            fail_writes: true,
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, json: &str) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("quota exceeded".into()));
        }
        self.data = Some(json.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("quota exceeded".into()));
        }
        self.data = None;
        Ok(())
    }
}

/// Decode a persisted ledger, restoring newest-first order.
pub fn decode_entries(json: &str) -> Result<Vec<TransactionEntry>, LedgerError> {
    let mut entries: Vec<TransactionEntry> = serde_json::from_str(json)?;
    entries.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
    Ok(entries)
}

pub struct Ledger<S> {
    store: S,
    entries: Vec<TransactionEntry>,
    persisted: bool,
}

impl<S: LedgerStore> Ledger<S> {
    /// Load the ledger from `store`. Missing or unreadable data starts an empty log.
    pub fn open(store: S) -> Self {
        let entries = match store.load() {
            Ok(Some(json)) => decode_entries(&json).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable ledger: {e}");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("ledger storage unavailable, starting empty: {e}");
                Vec::new()
            }
        };
        tracing::debug!("ledger opened with {} entries", entries.len());
        Self {
            store,
            entries,
            persisted: true,
        }
    }

    /// Record a locally initiated action at the current time.
    pub fn append(
        &mut self,
        direction: Direction,
        magnitude: f64,
        description: impl Into<String>,
        currency: Option<&str>,
    ) -> Result<&TransactionEntry, LedgerError> {
        self.append_at(direction, magnitude, description, currency, Utc::now())
    }

    /// Record a locally initiated action at `now`.
    ///
    /// The entry is kept in memory even if persisting fails; the failure is
    /// logged and reflected by [`Ledger::is_persisted`].
    pub fn append_at(
        &mut self,
        direction: Direction,
        magnitude: f64,
        description: impl Into<String>,
        currency: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<&TransactionEntry, LedgerError> {
        if !magnitude.is_finite() {
            return Err(LedgerError::NonFiniteAmount(magnitude));
        }
        let currency = currency
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CURRENCY);

        let head = self.entries.first();
        // Never older than the current head, so the list stays newest-first.
        let created_at = head
            .map(|e| e.created_at)
            .map_or(now.timestamp_millis(), |t| t.max(now.timestamp_millis()));
        let last_id = self.entries.iter().map(|e| e.id).max();
        // Rows are untrusted; an id at the top of the range re-bases on the clock.
        let id = last_id
            .and_then(|last| last.checked_add(1))
            .map_or(created_at, |next| created_at.max(next));

        let entry = TransactionEntry {
            id,
            direction,
            amount: format_signed_amount(direction, magnitude, currency),
            currency: currency.to_string(),
            description: description.into(),
            status: TxStatus::Completed,
            created_at,
        };
        tracing::info!("ledger: {} {}", entry.amount, entry.description);
        self.entries.insert(0, entry);
        self.persist();
        Ok(&self.entries[0])
    }

    /// Entries newest-first.
    pub fn list(&self) -> &[TransactionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the last write reached the store.
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Drop the whole log.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.persisted = match self.store.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to clear persisted ledger: {e}");
                false
            }
        };
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(|e| StoreError::Write(e.to_string()))
            .and_then(|json| self.store.save(&json));
        self.persisted = match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("ledger entry kept in memory only: {e}");
                false
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn starts_empty_without_seed_data() {
        let ledger = Ledger::open(MemoryStore::new());
        assert!(ledger.is_empty());
        assert!(ledger.store().data().is_none());
    }

    #[test]
    fn append_formats_signed_amount() {
        let mut ledger = Ledger::open(MemoryStore::new());
        let entry = ledger
            .append_at(Direction::Sent, 0.1, "Bought 100ml", Some("SUI"), t(0))
            .unwrap();
        assert_eq!(entry.amount, "-0.1 SUI");
        assert_eq!(entry.direction, Direction::Sent);
        assert_eq!(entry.status, TxStatus::Completed);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn sign_comes_from_direction() {
        let mut ledger = Ledger::open(MemoryStore::new());
        let sent = ledger
            .append_at(Direction::Sent, -2.5, "refund?", None, t(0))
            .unwrap()
            .amount
            .clone();
        assert_eq!(sent, "-2.5 SUI");
        let received = ledger
            .append_at(Direction::Received, -2.5, "in", Some("NGN"), t(1))
            .unwrap();
        assert_eq!(received.amount, "+2.5 NGN");
        assert_eq!(received.currency, "NGN");
    }

    #[test]
    fn rejects_non_finite_magnitude() {
        let mut ledger = Ledger::open(MemoryStore::new());
        assert!(matches!(
            ledger.append_at(Direction::Sent, f64::NAN, "x", None, t(0)),
            Err(LedgerError::NonFiniteAmount(_))
        ));
        assert!(ledger.append_at(Direction::Sent, f64::INFINITY, "x", None, t(0)).is_err());
        assert!(ledger.is_empty());
    }

    #[test]
    fn newest_first_with_unique_ids_in_same_tick() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.append_at(Direction::Sent, 1.0, "a", None, t(0)).unwrap();
        ledger.append_at(Direction::Sent, 2.0, "b", None, t(0)).unwrap();
        ledger.append_at(Direction::Sent, 3.0, "c", None, t(5)).unwrap();

        let descriptions: Vec<_> = ledger.list().iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["c", "b", "a"]);
        let ids: Vec<_> = ledger.list().iter().map(|e| e.id).collect();
        assert!(ids.windows(2).all(|w| w[0] > w[1]), "ids {ids:?}");
    }

    #[test]
    fn clock_going_backwards_keeps_order() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.append_at(Direction::Sent, 1.0, "late", None, t(1000)).unwrap();
        ledger.append_at(Direction::Sent, 1.0, "early", None, t(0)).unwrap();
        let list = ledger.list();
        assert_eq!(list[0].description, "early");
        assert!(list[0].created_at >= list[1].created_at);
        assert!(list[0].id > list[1].id);
    }

    #[test]
    fn round_trips_through_store() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.append_at(Direction::Sent, 0.1, "Bought 100ml", None, t(0)).unwrap();
        ledger.append_at(Direction::Received, 4.0, "from friend", None, t(10)).unwrap();
        let before = ledger.list().to_vec();

        let reloaded = Ledger::open(ledger.store().clone());
        assert_eq!(reloaded.list(), before.as_slice());
    }

    #[test]
    fn persisted_layout_is_camel_case() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.append_at(Direction::Sent, 0.1, "Bought 100ml", None, t(0)).unwrap();
        let json: serde_json::Value = serde_json::from_str(ledger.store().data().unwrap()).unwrap();
        let row = &json[0];
        assert_eq!(row["direction"], "sent");
        assert_eq!(row["amount"], "-0.1 SUI");
        assert_eq!(row["status"], "completed");
        assert_eq!(row["createdAt"], 1_700_000_000_000i64);
    }

    #[test]
    fn pending_and_failed_survive_reload() {
        let json = r#"[
            {"id":2,"direction":"received","amount":"+1 SUI","description":"b","status":"pending","createdAt":20},
            {"id":1,"direction":"sent","amount":"-1 SUI","currency":"SUI","description":"a","status":"failed","createdAt":10}
        ]"#;
        let mut ledger = Ledger::open(MemoryStore::with_data(json));
        assert_eq!(ledger.list()[0].status, TxStatus::Pending);
        assert_eq!(ledger.list()[0].currency, "SUI");
        assert_eq!(ledger.list()[1].status, TxStatus::Failed);

        ledger.append_at(Direction::Sent, 1.0, "c", None, t(0)).unwrap();
        let reloaded = Ledger::open(ledger.store().clone());
        assert_eq!(reloaded.list()[1].status, TxStatus::Pending);
        assert_eq!(reloaded.list()[2].status, TxStatus::Failed);
    }

    #[test]
    fn out_of_order_data_is_sorted_on_load() {
        let json = r#"[
            {"id":1,"direction":"sent","amount":"-1 SUI","description":"old","status":"completed","createdAt":10},
            {"id":2,"direction":"sent","amount":"-1 SUI","description":"new","status":"completed","createdAt":20}
        ]"#;
        let ledger = Ledger::open(MemoryStore::with_data(json));
        assert_eq!(ledger.list()[0].description, "new");
    }

    #[test]
    fn corrupt_data_starts_empty() {
        let ledger = Ledger::open(MemoryStore::with_data("{not json"));
        assert!(ledger.is_empty());
        assert!(matches!(decode_entries("{not json"), Err(LedgerError::Corrupt(_))));
    }

    #[test]
    fn write_failure_keeps_memory_state() {
        let mut ledger = Ledger::open(MemoryStore::failing());
        let entry = ledger.append_at(Direction::Sent, 0.2, "Bought 200ml", None, t(0));
        assert!(entry.is_ok());
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_persisted());
    }

    #[test]
    fn clear_empties_log_and_store() {
        let mut ledger = Ledger::open(MemoryStore::new());
        ledger.append_at(Direction::Sent, 1.0, "a", None, t(0)).unwrap();
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.store().data().is_none());
        assert!(Ledger::open(ledger.store().clone()).is_empty());
    }

    #[test]
    fn extreme_stored_values_do_not_overflow() {
        let json = format!(
            r#"[{{"id":{},"direction":"sent","amount":"-1 SUI","description":"max","status":"completed","createdAt":10}}]"#,
            i64::MAX
        );
        let mut ledger = Ledger::open(MemoryStore::with_data(json));
        let entry = ledger.append_at(Direction::Sent, 1.0, "x", None, t(0)).unwrap();
        assert_eq!(entry.id, t(0).timestamp_millis());
        assert_eq!(ledger.list()[0].description, "x");

        assert!(format_time_ago(i64::MIN, t(0)).ends_with("d ago"));
        assert_eq!(format_time_ago(i64::MAX, t(0)), "Just now");
    }

    #[test]
    fn time_ago_buckets() {
        let now = t(0);
        let base = now.timestamp_millis();
        assert_eq!(format_time_ago(base - 30_000, now), "Just now");
        assert_eq!(format_time_ago(base - 5 * 60_000, now), "5m ago");
        assert_eq!(format_time_ago(base - 3 * 3_600_000, now), "3h ago");
        assert_eq!(format_time_ago(base - 2 * 86_400_000, now), "2d ago");
        assert_eq!(format_time_ago(base + 60_000, now), "Just now");
    }
}
