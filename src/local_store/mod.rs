//! Client-side payslip store.
//!
//! The whole collection lives as one JSON document `{ "records": [...] }`
//! under a single key. Every operation reads and/or rewrites the full
//! document; lookups are linear scans. There is no cross-process
//! coordination: two writers racing on the same backend lose updates, last
//! writer wins.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::payslip::PayslipEntry;

mod backend;

pub use backend::{FileKeyValue, KeyValueStore, MemoryKeyValue};

pub const STORAGE_KEY: &str = "AGROPALM_DESPRENDIBLES";

#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored collection is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("invalid storage key `{0}`")]
    InvalidKey(String),
    #[error("no record id left after {0}")]
    IdsExhausted(u64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub id: u64,
    #[serde(flatten)]
    pub entry: PayslipEntry,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    records: Vec<LocalRecord>,
}

/// Seed written by [`LocalPayslipStore::initialize`] when nothing is stored.
pub fn seed_records() -> Vec<LocalRecord> {
    let seed = |id: u64, citizen_id: &str, name: &str, file_name: &str| LocalRecord {
        id,
        entry: PayslipEntry {
            citizen_id: citizen_id.into(),
            name: name.into(),
            period: "primera-2026-01".into(),
            period_label: "Primera Quincena Enero 2026".into(),
            upload_date: "28/01/2026".into(),
            file_name: file_name.into(),
            status: "Procesado".into(),
        },
    };

    vec![
        seed(1, "1234567890", "Juan Pérez", "desprendible_juan_q1_2026.pdf"),
        seed(2, "9876543210", "María García", "desprendible_maria_q1_2026.pdf"),
    ]
}

pub struct LocalPayslipStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> LocalPayslipStore<S> {
    /// Opens the store and runs [`initialize`](Self::initialize).
    pub fn open(backend: S) -> Result<Self, LocalStoreError> {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: impl Into<String>) -> Result<Self, LocalStoreError> {
        let store = Self {
            backend,
            key: key.into(),
        };
        store.initialize()?;
        Ok(store)
    }

    /// Writes the seed collection if none exists. Safe to call on every
    /// startup.
    pub fn initialize(&self) -> Result<(), LocalStoreError> {
        if self.backend.get(&self.key)?.is_none() {
            info!(key = %self.key, "Seeding local payslip store");
            self.write(&Collection {
                records: seed_records(),
            })?;
        }
        Ok(())
    }

    /// Full collection in storage order (newest first).
    pub fn get_all(&self) -> Result<Vec<LocalRecord>, LocalStoreError> {
        Ok(self.read()?.records)
    }

    pub fn get_by_citizen_id(&self, citizen_id: &str) -> Result<Vec<LocalRecord>, LocalStoreError> {
        Ok(self
            .read()?
            .records
            .into_iter()
            .filter(|r| r.entry.citizen_id == citizen_id)
            .collect())
    }

    pub fn find(
        &self,
        citizen_id: &str,
        period: &str,
    ) -> Result<Option<LocalRecord>, LocalStoreError> {
        Ok(self
            .read()?
            .records
            .into_iter()
            .find(|r| r.entry.citizen_id == citizen_id && r.entry.period == period))
    }

    /// Prepends the entry with id `max + 1` (or 1) and returns the stored
    /// record. A second slip for the same `(citizen_id, period)` is not
    /// stored and yields `None`.
    pub fn add(&self, entry: PayslipEntry) -> Result<Option<LocalRecord>, LocalStoreError> {
        let mut collection = self.read()?;

        let duplicate = collection
            .records
            .iter()
            .any(|r| r.entry.citizen_id == entry.citizen_id && r.entry.period == entry.period);
        if duplicate {
            debug!(citizen_id = %entry.citizen_id, period = %entry.period, "Local payslip already exists");
            return Ok(None);
        }

        let max = collection.records.iter().map(|r| r.id).max().unwrap_or(0);
        let id = max.checked_add(1).ok_or(LocalStoreError::IdsExhausted(max))?;
        let record = LocalRecord { id, entry };
        collection.records.insert(0, record.clone());
        self.write(&collection)?;

        Ok(Some(record))
    }

    /// Removes the first record matching `(citizen_id, period)` and rewrites
    /// the collection in one write. Returns whether anything was removed.
    pub fn delete(&self, citizen_id: &str, period: &str) -> Result<bool, LocalStoreError> {
        let mut collection = self.read()?;

        let Some(index) = collection
            .records
            .iter()
            .position(|r| r.entry.citizen_id == citizen_id && r.entry.period == period)
        else {
            return Ok(false);
        };

        collection.records.remove(index);
        self.write(&collection)?;
        Ok(true)
    }

    /// Drops everything and re-seeds.
    pub fn clear(&self) -> Result<(), LocalStoreError> {
        self.backend.remove(&self.key)?;
        self.initialize()
    }

    fn read(&self) -> Result<Collection, LocalStoreError> {
        match self.backend.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Collection::default()),
        }
    }

    fn write(&self, collection: &Collection) -> Result<(), LocalStoreError> {
        let raw = serde_json::to_string(collection)?;
        self.backend.set(&self.key, &raw)
    }
}
