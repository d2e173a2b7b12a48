//! Durable named slots holding JSON documents.
//!
//! [`LocalStore`] is the persistence surface the screens use. It never fails:
//! a missing or unreadable slot loads as the caller's fallback, and a failed write
//! is logged and dropped, leaving the in-memory state authoritative for the session.
//!
//! The slot backend is injected through [`SlotStorage`]:
//!
//! - [`LmdbSlots`] keeps every slot in one LMDB environment on disk.
//! - [`MemorySlots`] keeps them in process, with an optional byte quota.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use lmdb::{Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::app_response::AppResponse;

const SLOTS_DB_NAME: &str = "slots";

/// Raw access to named slots. Contents are opaque text.
pub trait SlotStorage {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse>;

    fn write_slot(&self, key: &str, contents: &str) -> Result<(), AppResponse>;

    /// Returns `false` when the slot did not exist.
    fn remove_slot(&self, key: &str) -> Result<bool, AppResponse>;
}

/// LMDB-backed slots: one environment directory (`<name>.lmdb`), one named database.
pub struct LmdbSlots {
    env: Environment,
    db: Database,
    path: PathBuf,
}

impl LmdbSlots {
    /// Opens (or creates) the environment at `<name>.lmdb`.
    pub fn open(name: &str, map_size: usize) -> Result<Self, AppResponse> {
        let path = PathBuf::from(format!("{name}.lmdb"));
        if !path.exists() {
            info!("Creating slot database at: {}", path.display());
            fs::create_dir_all(&path)?;
        }

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(Some(SLOTS_DB_NAME), DatabaseFlags::empty())?;

        info!("Slot database ready at: {}", path.display());
        Ok(Self { env, db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes buffers to disk.
    pub fn sync(&self) -> Result<(), AppResponse> {
        self.env.sync(true)?;
        Ok(())
    }
}

impl SlotStorage for LmdbSlots {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let txn = self.env.begin_ro_txn()?;
        let contents = match txn.get(self.db, &key) {
            Ok(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            Err(lmdb::Error::NotFound) => None,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(contents)
    }

    fn write_slot(&self, key: &str, contents: &str) -> Result<(), AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &contents, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> Result<bool, AppResponse> {
        let mut txn = self.env.begin_rw_txn()?;
        let removed = match txn.del(self.db, &key, None) {
            Ok(()) => true,
            Err(lmdb::Error::NotFound) => false,
            Err(e) => return Err(e.into()),
        };
        txn.commit()?;
        Ok(removed)
    }
}

/// In-process slots. With a quota, a write that would push the total stored
/// bytes past it fails the way a full browser storage does.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, AppResponse> {
        self.slots
            .lock()
            .map_err(|_| AppResponse::DatabaseError("Slot map lock poisoned".to_string()))
    }
}

impl SlotStorage for MemorySlots {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn write_slot(&self, key: &str, contents: &str) -> Result<(), AppResponse> {
        let mut slots = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = slots
                .iter()
                .filter(|(slot, _)| slot.as_str() != key)
                .map(|(slot, value)| slot.len() + value.len())
                .sum();
            if others + key.len() + contents.len() > quota {
                return Err(AppResponse::DatabaseError(format!(
                    "Storage quota of {} bytes exceeded",
                    quota
                )));
            }
        }
        slots.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> Result<bool, AppResponse> {
        Ok(self.lock()?.remove(key).is_some())
    }
}

/// Fail-soft JSON persistence over any [`SlotStorage`].
pub struct LocalStore<S: SlotStorage> {
    slots: S,
}

impl<S: SlotStorage> LocalStore<S> {
    pub fn new(slots: S) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Reads and parses a slot. Absent, unreadable or malformed content yields `fallback`.
    pub fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let contents = match self.slots.read_slot(key) {
            Ok(Some(contents)) => contents,
            Ok(None) => return fallback,
            Err(e) => {
                warn!("Could not read slot '{}': {}", key, e);
                return fallback;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(e) => {
                warn!("Slot '{}' holds malformed content, using fallback: {}", key, e);
                fallback
            }
        }
    }

    /// Serializes and writes a slot. Failures are logged and swallowed.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize value for slot '{}': {}", key, e);
                return;
            }
        };

        match self.slots.write_slot(key, &json) {
            Ok(()) => debug!("Saved slot '{}' ({} bytes)", key, json.len()),
            Err(e) => warn!("Could not write slot '{}': {}", key, e),
        }
    }

    /// Prepends `record` to the collection in `key` and writes it back.
    ///
    /// Entries are carried over one by one, so an entry this build cannot parse
    /// (say, a status set by another workflow) stays in the slot untouched. Only a
    /// slot that is not a JSON array at all is replaced. The returned collection
    /// holds the entries that parse as `R`.
    ///
    /// Read-modify-write of the whole collection: a concurrent writer on the
    /// same slot can lose updates.
    pub fn append<R: Serialize + DeserializeOwned>(&self, key: &str, record: R) -> Vec<R> {
        let mut entries: Vec<JsonValue> = match self.slots.read_slot(key) {
            Ok(Some(contents)) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Slot '{}' is not a collection, overwriting it: {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Could not read slot '{}' before append: {}", key, e);
                Vec::new()
            }
        };

        match serde_json::to_value(&record) {
            Ok(value) => entries.insert(0, value),
            Err(e) => {
                warn!("Could not serialize record for slot '{}': {}", key, e);
                return parse_entries(key, entries);
            }
        }
        self.save(key, &entries);
        parse_entries(key, entries)
    }

    /// Drops a slot entirely. Later loads see the fallback again.
    pub fn clear(&self, key: &str) -> bool {
        match self.slots.remove_slot(key) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Could not clear slot '{}': {}", key, e);
                false
            }
        }
    }
}

fn parse_entries<R: DeserializeOwned>(key: &str, entries: Vec<JsonValue>) -> Vec<R> {
    entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping unreadable entry in slot '{}': {}", key, e);
                None
            }
        })
        .collect()
}
