//! Cooldown record storage and persistence.
//!
//! Records are string key/value pairs, `lastSend_<address>` → decimal
//! milliseconds, so the on-disk file reads like the browser's local storage.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Prefix of every cooldown key.
pub const KEY_PREFIX: &str = "lastSend_";

/// Storage key for an address.
pub fn cooldown_key(address: &Address) -> String {
    format!("{}{}", KEY_PREFIX, address)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cooldown store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cooldown store is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("cooldown record {key} holds non-numeric value '{value}'")]
    Corrupt { key: String, value: String },
}

/// Persistence boundary for cooldown records.
pub trait CooldownStore: Send + Sync {
    /// Timestamp (ms since epoch) of the last successful send, if any.
    fn last_send(&self, address: &Address) -> Result<Option<u64>, StoreError>;

    /// Overwrite the record for `address`.
    fn record_send(&self, address: &Address, at_millis: u64) -> Result<(), StoreError>;
}

fn parse_record(key: &str, value: &str) -> Result<u64, StoreError> {
    value.trim().parse().map_err(|_| StoreError::Corrupt {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Process-local store. Records vanish with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl CooldownStore for MemoryStore {
    fn last_send(&self, address: &Address) -> Result<Option<u64>, StoreError> {
        let key = cooldown_key(address);
        match self.inner.get(&key) {
            Some(value) => parse_record(&key, value.value()).map(Some),
            None => Ok(None),
        }
    }

    fn record_send(&self, address: &Address, at_millis: u64) -> Result<(), StoreError> {
        self.inner.insert(cooldown_key(address), at_millis.to_string());
        Ok(())
    }
}

/// JSON-file store. Every write rewrites the file through a temp file.
#[derive(Debug)]
pub struct FileStore {
    records: DashMap<String, String>,
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`, loading existing records if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = DashMap::new();

        if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            let map: BTreeMap<String, String> = serde_json::from_reader(reader)?;
            for (k, v) in map {
                records.insert(k, v);
            }
            tracing::info!(path = %path.display(), records = records.len(), "Loaded cooldown records");
        }

        Ok(Self {
            records,
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `map` to disk. The caller holds `write_lock`.
    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("json.tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(writer, map)?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(path = %self.path.display(), records = map.len(), "Saved cooldown records");
        Ok(())
    }
}

impl CooldownStore for FileStore {
    fn last_send(&self, address: &Address) -> Result<Option<u64>, StoreError> {
        let key = cooldown_key(address);
        match self.records.get(&key) {
            Some(value) => parse_record(&key, value.value()).map(Some),
            None => Ok(None),
        }
    }

    /// The record becomes visible only once the file holding it is in place.
    fn record_send(&self, address: &Address, at_millis: u64) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let key = cooldown_key(address);
        let value = at_millis.to_string();
        let mut map: BTreeMap<String, String> = self
            .records
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        map.insert(key.clone(), value.clone());

        self.save(&map)?;
        self.records.insert(key, value);
        Ok(())
    }
}
