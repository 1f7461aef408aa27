use drip_common::ledger::{LedgerStore, StoreError};

/// Ledger persisted under one key of the browser's `localStorage`.
///
/// Outside the browser every operation reports the store as unavailable and
/// the ledger keeps working from memory.
#[derive(Clone, Debug)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[cfg(target_family = "wasm")]
fn storage() -> Result<web_sys::Storage, StoreError> {
    let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
    window
        .local_storage()
        .map_err(|e| StoreError::Unavailable(format!("{e:?}")))?
        .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))
}

#[cfg(target_family = "wasm")]
impl LedgerStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        storage()?
            .get_item(&self.key)
            .map_err(|e| StoreError::Read(format!("{e:?}")))
    }

    fn save(&mut self, json: &str) -> Result<(), StoreError> {
        // Quota errors surface here.
        storage()?
            .set_item(&self.key, json)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        storage()?
            .remove_item(&self.key)
            .map_err(|e| StoreError::Write(format!("{e:?}")))
    }
}

#[cfg(not(target_family = "wasm"))]
impl LedgerStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn save(&mut self, _json: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(format!(
            "no localStorage for {}",
            self.key
        )))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(format!(
            "no localStorage for {}",
            self.key
        )))
    }
}
