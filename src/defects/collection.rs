//! # Defect Collection
//!
//! The authoritative, ordered, in-memory sequence of defect records and its
//! write-through mirror in a [`DataStore`].
//!
//! Records are kept in insertion order, which is the order `list` returns.
//! An id → position index sits beside the sequence; since nothing is ever
//! removed, positions never shift and the index never needs rebuilding after
//! load.
//!
//! Mutations are applied in memory first and then persisted with a full
//! rewrite. A failed save is reported to the caller but the in-memory change
//! stays: the next successful save will carry it to disk.

use crate::config::OnCorrupt;
use crate::error::{DefectError, Result};
use crate::model::Defect;
use crate::store::{DataStore, LoadOutcome};
use std::collections::HashMap;

pub struct DefectCollection<S: DataStore> {
    records: Vec<Defect>,
    index: HashMap<String, usize>,
    store: S,
}

impl<S: DataStore> DefectCollection<S> {
    /// Load the persisted records from `store`, applying `on_corrupt` when the
    /// record data exists but cannot be read.
    pub fn load(mut store: S, on_corrupt: OnCorrupt) -> Result<Self> {
        let records = match store.load_defects() {
            Ok(LoadOutcome::Loaded(records)) => {
                tracing::info!(
                    count = records.len(),
                    location = %store.location(),
                    "loaded defects from storage"
                );
                records
            }
            Ok(LoadOutcome::Created) => {
                tracing::info!(location = %store.location(), "created empty defects storage");
                Vec::new()
            }
            Err(e) => match on_corrupt {
                OnCorrupt::Fail => {
                    return Err(DefectError::Store(format!(
                        "cannot load defect records from {}: {}",
                        store.location(),
                        e
                    )));
                }
                OnCorrupt::StartEmpty => {
                    let moved_to = store.quarantine_defects()?;
                    tracing::warn!(
                        error = %e,
                        moved_to = %moved_to,
                        "defect records unreadable, starting with an empty store"
                    );
                    store.save_defects(&[])?;
                    Vec::new()
                }
            },
        };
        Ok(Self::from_records(records, store))
    }

    fn from_records(records: Vec<Defect>, store: S) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, defect) in records.iter().enumerate() {
            // First occurrence wins for files written before ids were enforced unique
            if index.contains_key(&defect.defect_id) {
                tracing::warn!(id = %defect.defect_id, "duplicate defect id in record file");
                continue;
            }
            index.insert(defect.defect_id.clone(), pos);
        }
        Self {
            records,
            index,
            store,
        }
    }

    pub fn records(&self) -> &[Defect] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Defect> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Defect> {
        let pos = *self.index.get(id)?;
        self.records.get_mut(pos)
    }

    /// Append a record. Callers are responsible for rejecting duplicate ids.
    pub fn push(&mut self, defect: Defect) -> &Defect {
        let pos = self.records.len();
        self.index.entry(defect.defect_id.clone()).or_insert(pos);
        self.records.push(defect);
        &self.records[pos]
    }

    /// Rewrite the whole record sequence to the store.
    pub fn save_all(&mut self) -> Result<()> {
        match self.store.save_defects(&self.records) {
            Ok(()) => {
                tracing::debug!(count = self.records.len(), "defects saved");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, location = %self.store.location(), "failed to save defects");
                Err(e)
            }
        }
    }

    pub fn write_image(&mut self, bytes: &[u8]) -> Result<String> {
        self.store.write_image(bytes)
    }

    pub fn read_image(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        self.store.read_image(filename)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
