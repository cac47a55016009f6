//! Storage layer for Sommelier data.
//!
//! Each named collection lives in its own JSON document under the data
//! directory (default `~/.local/share/sommelier/`, overridable with
//! `SOM_DATA_DIR` or `-D/--data-dir`):
//!
//! - `history.json` - bounded recent-search list
//! - `cellar.json` - cellar inventory items
//! - `current.json` - the most recently analyzed/viewed report
//!
//! Every mutation rewrites the whole document (write-temp-then-rename, so a
//! reader never observes a half-written file). There is no schema
//! versioning: a structurally incompatible document is dropped with a
//! logged warning and the caller sees an empty collection. Read-side
//! corruption is absorbed; write errors propagate to the caller.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::WineReport;
use crate::{Error, Result, action_log};

/// Collection key for the recent-search history.
pub const HISTORY_KEY: &str = "history";

/// Collection key for the cellar inventory.
pub const CELLAR_KEY: &str = "cellar";

/// Key for the single-record current-view slot.
const CURRENT_KEY: &str = "current";

/// Resolve the data directory: explicit path (flag or SOM_DATA_DIR via
/// clap) wins, otherwise the per-user XDG data dir.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => default_data_dir(),
    }
}

/// The per-user default data directory, `~/.local/share/sommelier/`.
pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("sommelier"))
}

/// Store for the named local collections.
pub struct Store {
    /// Root directory holding the collection documents.
    root: PathBuf,
}

impl Store {
    /// Open the store, creating the data directory if needed. There is no
    /// separate init step: an empty directory is a valid, empty store.
    pub fn open(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Load a named collection.
    ///
    /// An absent document is an empty collection. An unreadable or
    /// unparseable document is also an empty collection, reported to the
    /// diagnostic sink; it is never an error for the caller.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let path = self.collection_path(key);
        if !path.exists() {
            return Vec::new();
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                self.warn(&format!(
                    "could not read {}: {}; treating as empty",
                    path.display(),
                    e
                ));
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                self.warn(&format!(
                    "dropping corrupt collection {}: {}",
                    path.display(),
                    e
                ));
                Vec::new()
            }
        }
    }

    /// Replace a named collection with the given items.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let json = serde_json::to_string(items)?;
        self.write_atomic(&self.collection_path(key), &json)
    }

    /// Load the current-view slot, if one is stored and parseable.
    pub fn load_current(&self) -> Option<WineReport> {
        let path = self.collection_path(CURRENT_KEY);
        if !path.exists() {
            return None;
        }

        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(report) => Some(report),
            Err(e) => {
                self.warn(&format!(
                    "dropping corrupt current slot {}: {}",
                    path.display(),
                    e
                ));
                None
            }
        }
    }

    /// Replace the current-view slot.
    pub fn save_current(&self, report: &WineReport) -> Result<()> {
        let json = serde_json::to_string(report)?;
        self.write_atomic(&self.collection_path(CURRENT_KEY), &json)
    }

    /// Remove the current-view slot. Absent slot is fine.
    pub fn clear_current(&self) -> Result<()> {
        let path = self.collection_path(CURRENT_KEY);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Write a document through a temp file in the same directory so the
    /// destination is replaced in one rename.
    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(contents.as_bytes())?;
        tmp.persist(path)
            .map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn warn(&self, message: &str) {
        eprintln!("Warning: {}", message);
        action_log::log_warning(&self.root, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellarItem, WineReport};
    use crate::test_utils::TestEnv;

    fn report(name: &str, vintage: &str) -> WineReport {
        let mut report: WineReport = serde_json::from_str(&format!(
            r#"{{"name":"{}","vintage":"{}"}}"#,
            name, vintage
        ))
        .unwrap();
        report.id = crate::models::generate_id("som", &format!("{}|{}", name, vintage));
        report
    }

    #[test]
    fn test_load_missing_collection_is_empty() {
        let env = TestEnv::new();
        let store = env.open_store();
        let history: Vec<WineReport> = store.load(HISTORY_KEY);
        assert!(history.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let env = TestEnv::new();
        let store = env.open_store();

        let history = vec![report("Barolo", "2015"), report("Chablis", "2020")];
        store.save(HISTORY_KEY, &history).unwrap();

        let loaded: Vec<WineReport> = store.load(HISTORY_KEY);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Barolo");
        assert_eq!(loaded[1].name, "Chablis");
    }

    #[test]
    fn test_corrupt_collection_loads_empty() {
        let env = TestEnv::new();
        let store = env.open_store();

        fs::write(env.data_path().join("cellar.json"), "{not json").unwrap();
        let cellar: Vec<CellarItem> = store.load(CELLAR_KEY);
        assert!(cellar.is_empty());
    }

    #[test]
    fn test_structurally_incompatible_collection_loads_empty() {
        let env = TestEnv::new();
        let store = env.open_store();

        // Valid JSON, wrong shape: an object where a list belongs.
        fs::write(env.data_path().join("history.json"), r#"{"a":1}"#).unwrap();
        let history: Vec<WineReport> = store.load(HISTORY_KEY);
        assert!(history.is_empty());
    }

    #[test]
    fn test_save_replaces_whole_collection() {
        let env = TestEnv::new();
        let store = env.open_store();

        store
            .save(HISTORY_KEY, &[report("Barolo", "2015"), report("Chablis", "2020")])
            .unwrap();
        store.save(HISTORY_KEY, &[report("Rioja", "2018")]).unwrap();

        let loaded: Vec<WineReport> = store.load(HISTORY_KEY);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Rioja");
    }

    #[test]
    fn test_current_slot_round_trip() {
        let env = TestEnv::new();
        let store = env.open_store();

        assert!(store.load_current().is_none());

        let current = report("Barolo", "2015");
        store.save_current(&current).unwrap();
        assert_eq!(store.load_current().unwrap().name, "Barolo");

        store.clear_current().unwrap();
        assert!(store.load_current().is_none());
    }

    #[test]
    fn test_clear_current_when_absent_is_ok() {
        let env = TestEnv::new();
        let store = env.open_store();
        store.clear_current().unwrap();
    }

    #[test]
    fn test_corrupt_current_slot_is_dropped() {
        let env = TestEnv::new();
        let store = env.open_store();
        fs::write(env.data_path().join("current.json"), "]]").unwrap();
        assert!(store.load_current().is_none());
    }
}
