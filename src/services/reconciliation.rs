//! Reconciliation service
//!
//! Registers and edits USD/PEN entries against operations. The parent
//! record is created on the first registration for an operation.

use chrono::NaiveDate;
use serde::Serialize;

use crate::audit::EntityType;
use crate::error::{CuadreError, CuadreResult};
use crate::models::{
    Currency, EntryFields, EntryId, Money, OperationId, ReconciliationEntry,
    ReconciliationRecord,
};
use crate::storage::Storage;

/// Service for reconciliation records and entries
pub struct ReconciliationService<'a> {
    storage: &'a Storage,
}

/// Raw entry fields as typed by the user
#[derive(Debug, Clone, Default)]
pub struct EntryInput {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub reference: String,
    pub difference: Option<String>,
}

impl EntryInput {
    /// Validate and convert to typed fields
    pub fn parse(&self, date_format: &str) -> CuadreResult<EntryFields> {
        let amount = Money::parse(&self.amount)
            .map_err(|e| CuadreError::Validation(e.to_string()))?;

        let difference = match self.difference.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => {
                Money::parse(d).map_err(|e| CuadreError::Validation(e.to_string()))?
            }
            _ => Money::zero(),
        };

        Ok(EntryFields {
            date: parse_entry_date(&self.date, date_format)?,
            description: self.description.trim().to_string(),
            amount,
            reference: self.reference.trim().to_string(),
            difference,
        })
    }
}

/// Parse an entry date ("15/01/2025" with the default format)
pub fn parse_entry_date(input: &str, format: &str) -> CuadreResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), format).map_err(|_| {
        CuadreError::Validation(format!(
            "Invalid date: '{}'. Expected format {}",
            input,
            format.replace("%d", "DD").replace("%m", "MM").replace("%Y", "YYYY")
        ))
    })
}

/// A record with its entries in creation order
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetails {
    pub record: ReconciliationRecord,
    pub usd: Vec<ReconciliationEntry>,
    pub pen: Vec<ReconciliationEntry>,
}

impl<'a> ReconciliationService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Return the operation's record, creating and auditing it when absent
    pub fn ensure_record(&self, operation_id: OperationId) -> CuadreResult<ReconciliationRecord> {
        let (record, created) = self.storage.reconciliations.upsert_record(operation_id)?;

        if created {
            self.storage.reconciliations.save()?;
            self.storage.log_create(
                EntityType::ReconciliationRecord,
                record.id.to_string(),
                None,
                &record,
            )?;
            tracing::debug!(record = %record.id, operation = %operation_id, "reconciliation record created");
        }

        Ok(record)
    }

    /// Register a new entry for an operation
    pub fn register(
        &self,
        operation_id: OperationId,
        currency: Currency,
        fields: EntryFields,
    ) -> CuadreResult<ReconciliationEntry> {
        let operation = self
            .storage
            .operations
            .get(operation_id)?
            .ok_or_else(|| CuadreError::operation_not_found(operation_id.to_string()))?;

        let record = self.ensure_record(operation.id)?;

        let entry = ReconciliationEntry::new(record.id, currency, fields);
        self.storage.reconciliations.insert_entry(entry.clone())?;
        self.storage.reconciliations.touch_record(record.id)?;
        self.storage.reconciliations.save()?;

        self.storage.log_create(
            EntityType::for_currency(currency),
            entry.id.to_string(),
            Some(operation.label()),
            &entry,
        )?;

        tracing::info!(
            operation = operation.number,
            currency = %currency,
            amount = %entry.amount,
            "entry registered"
        );

        Ok(entry)
    }

    /// Overwrite the editable fields of an existing entry
    ///
    /// An id that names an entry of the other currency is not found.
    pub fn edit(
        &self,
        entry_id: EntryId,
        currency: Currency,
        fields: EntryFields,
    ) -> CuadreResult<ReconciliationEntry> {
        let before = self
            .storage
            .reconciliations
            .get_entry(entry_id)?
            .filter(|e| e.currency == currency)
            .ok_or_else(|| CuadreError::entry_not_found(currency.entry_label(), entry_id.to_string()))?;

        let mut entry = before.clone();
        entry.apply(fields);

        self.storage.reconciliations.update_entry(entry.clone())?;
        self.storage.reconciliations.save()?;

        self.storage.log_update(
            EntityType::for_currency(currency),
            entry.id.to_string(),
            None,
            &before,
            &entry,
            None,
        )?;

        Ok(entry)
    }

    /// Resolve an entry id typed in full or as a unique prefix
    pub fn find_entry_id(&self, record_hint: Option<&RecordDetails>, text: &str) -> Option<EntryId> {
        if let Ok(id) = text.trim().parse::<EntryId>() {
            return Some(id);
        }
        let details = record_hint?;
        let mut matches = details
            .usd
            .iter()
            .chain(details.pen.iter())
            .filter(|e| e.id.matches_prefix(text));
        let first = matches.next()?;
        matches.next().is_none().then_some(first.id)
    }

    /// The operation's record with all entries
    pub fn fetch_by_operation(&self, operation_id: OperationId) -> CuadreResult<RecordDetails> {
        let record = self
            .storage
            .reconciliations
            .get_record_by_operation(operation_id)?
            .ok_or_else(|| CuadreError::record_not_found(operation_id.to_string()))?;

        Ok(RecordDetails {
            usd: self
                .storage
                .reconciliations
                .entries_for(record.id, Currency::Usd)?,
            pen: self
                .storage
                .reconciliations
                .entries_for(record.id, Currency::Pen)?,
            record,
        })
    }
}
