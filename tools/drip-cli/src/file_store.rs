use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use drip_common::ledger::{LedgerStore, StoreError};

/// Ledger persisted as a JSON file on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/drip/<storage_key>.json`, falling back to /tmp.
    pub fn default_path(storage_key: &str) -> PathBuf {
        let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        data.join("drip").join(format!("{storage_key}.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read(format!("{}: {e}", self.path.display()))),
        }
    }

    fn save(&mut self, json: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Unavailable(format!("{}: {e}", parent.display())))?;
        }
        // Write then rename so a crash never leaves a half-written ledger.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)
            .and_then(|()| std::fs::rename(&tmp, &self.path))
            .map_err(|e| StoreError::Write(format!("{}: {e}", self.path.display())))
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Write(format!("{}: {e}", self.path.display()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drip_common::ledger::{Direction, Ledger};

    #[test]
    fn missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("ledger.json"));
        assert_eq!(store.load(), Ok(None));
        assert!(Ledger::open(store).is_empty());
    }

    #[test]
    fn ledger_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.json");

        let mut ledger = Ledger::open(FileStore::new(&path));
        ledger.append(Direction::Sent, 0.1, "Bought 100ml", None).unwrap();
        ledger.append(Direction::Received, 2.0, "from friend", Some("SUI")).unwrap();
        assert!(ledger.is_persisted());
        let before = ledger.list().to_vec();

        let reopened = Ledger::open(FileStore::new(&path));
        assert_eq!(reopened.list(), before.as_slice());
        assert_eq!(reopened.list()[1].amount, "-0.1 SUI");
    }

    #[test]
    fn clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut ledger = Ledger::open(FileStore::new(&path));
        ledger.append(Direction::Sent, 1.0, "x", None).unwrap();
        assert!(path.exists());
        ledger.clear();
        assert!(!path.exists());
        ledger.clear();
        assert!(ledger.is_persisted());
    }

    #[test]
    fn unwritable_location_keeps_memory_state() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a dir").unwrap();

        let mut ledger = Ledger::open(FileStore::new(blocker.join("ledger.json")));
        ledger.append(Direction::Sent, 1.0, "x", None).unwrap();
        assert_eq!(ledger.len(), 1);
        assert!(!ledger.is_persisted());
    }
}
