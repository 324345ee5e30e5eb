//! Reconciliation repository for JSON storage
//!
//! Records and their USD/PEN entries live together in reconciliations.json.
//! Entries keep their creation order, which the report depends on.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::CuadreError;
use crate::models::{
    Currency, EntryId, OperationId, ReconciliationEntry, ReconciliationRecord, RecordId,
};

use super::file_io::{read_json, write_json_atomic};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ReconciliationData {
    records: Vec<ReconciliationRecord>,
    entries: Vec<ReconciliationEntry>,
}

#[derive(Default)]
struct State {
    records: HashMap<RecordId, ReconciliationRecord>,
    entries: HashMap<EntryId, ReconciliationEntry>,
    /// Index: operation_id -> record_id
    by_operation: HashMap<OperationId, RecordId>,
    /// Index: record_id -> entry ids in creation order
    by_record: HashMap<RecordId, Vec<EntryId>>,
    /// Entry ids in creation order
    order: Vec<EntryId>,
}

/// Repository for reconciliation records and entries
pub struct ReconciliationRepository {
    path: PathBuf,
    state: RwLock<State>,
}

impl ReconciliationRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            state: RwLock::new(State::default()),
        }
    }

    pub fn load(&self) -> Result<(), CuadreError> {
        let file_data: ReconciliationData = read_json(&self.path)?;

        let mut state = self
            .state
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        *state = State::default();

        for record in file_data.records {
            state.by_operation.insert(record.operation_id, record.id);
            state.records.insert(record.id, record);
        }

        // The file is written in creation order; keep it
        for entry in file_data.entries {
            state.order.push(entry.id);
            state.by_record.entry(entry.record_id).or_default().push(entry.id);
            state.entries.insert(entry.id, entry);
        }

        Ok(())
    }

    pub fn save(&self) -> Result<(), CuadreError> {
        let state = self
            .state
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut records: Vec<_> = state.records.values().cloned().collect();
        records.sort_by_key(|r| r.created_at);

        let entries = state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect();

        write_json_atomic(&self.path, &ReconciliationData { records, entries })
    }

    pub fn get_record_by_operation(
        &self,
        operation_id: OperationId,
    ) -> Result<Option<ReconciliationRecord>, CuadreError> {
        let state = self
            .state
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(state
            .by_operation
            .get(&operation_id)
            .and_then(|id| state.records.get(id).cloned()))
    }

    /// Return the operation's record, creating it if absent
    ///
    /// The flag is true when a new record was created.
    pub fn upsert_record(
        &self,
        operation_id: OperationId,
    ) -> Result<(ReconciliationRecord, bool), CuadreError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(existing) = state
            .by_operation
            .get(&operation_id)
            .and_then(|id| state.records.get(id))
        {
            return Ok((existing.clone(), false));
        }

        let record = ReconciliationRecord::new(operation_id);
        state.by_operation.insert(operation_id, record.id);
        state.records.insert(record.id, record.clone());
        Ok((record, true))
    }

    /// Bump the record's update timestamp
    pub fn touch_record(&self, id: RecordId) -> Result<(), CuadreError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match state.records.get_mut(&id) {
            Some(record) => {
                record.touch();
                Ok(())
            }
            None => Err(CuadreError::record_not_found(id.to_string())),
        }
    }

    pub fn get_entry(&self, id: EntryId) -> Result<Option<ReconciliationEntry>, CuadreError> {
        let state = self
            .state
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(state.entries.get(&id).cloned())
    }

    /// Append a new entry; the owning record must exist
    pub fn insert_entry(&self, entry: ReconciliationEntry) -> Result<(), CuadreError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if !state.records.contains_key(&entry.record_id) {
            return Err(CuadreError::record_not_found(entry.record_id.to_string()));
        }
        if state.entries.contains_key(&entry.id) {
            return Err(CuadreError::Duplicate {
                entity_type: entry.currency.entry_label(),
                identifier: entry.id.to_string(),
            });
        }

        state.order.push(entry.id);
        state.by_record.entry(entry.record_id).or_default().push(entry.id);
        state.entries.insert(entry.id, entry);
        Ok(())
    }

    /// Replace an existing entry in place, keeping its position
    pub fn update_entry(&self, entry: ReconciliationEntry) -> Result<(), CuadreError> {
        let mut state = self
            .state
            .write()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match state.entries.get_mut(&entry.id) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(CuadreError::entry_not_found(
                entry.currency.entry_label(),
                entry.id.to_string(),
            )),
        }
    }

    /// Entries of one currency for a record, in creation order
    pub fn entries_for(
        &self,
        record_id: RecordId,
        currency: Currency,
    ) -> Result<Vec<ReconciliationEntry>, CuadreError> {
        let state = self
            .state
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let Some(ids) = state.by_record.get(&record_id) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| state.entries.get(id))
            .filter(|e| e.currency == currency)
            .cloned()
            .collect())
    }

    pub fn record_count(&self) -> Result<usize, CuadreError> {
        let state = self
            .state
            .read()
            .map_err(|e| CuadreError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(state.records.len())
    }
}
