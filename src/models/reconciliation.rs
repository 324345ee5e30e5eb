//! Reconciliation records and entries
//!
//! A record is created lazily the first time an entry is registered for an
//! operation. Entries are settlement lines in USD or PEN; their order of
//! creation drives the report layout.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{EntryId, OperationId, RecordId};
use super::money::Money;

/// Currency of a reconciliation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Pen,
}

impl Currency {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" | "DOLARES" | "DÓLARES" => Some(Self::Usd),
            "PEN" | "SOLES" => Some(Self::Pen),
            _ => None,
        }
    }

    /// Entity name used in errors and the audit log
    pub fn entry_label(&self) -> &'static str {
        match self {
            Self::Usd => "USD entry",
            Self::Pen => "PEN entry",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Pen => "S/ ",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usd => f.pad("USD"),
            Self::Pen => f.pad("PEN"),
        }
    }
}

/// Per-operation container of entries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationRecord {
    pub id: RecordId,
    pub operation_id: OperationId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReconciliationRecord {
    pub fn new(operation_id: OperationId) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            operation_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// User-editable fields of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFields {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub reference: String,
    /// Stored as entered; reports recompute differences
    pub difference: Money,
}

/// One settlement line recorded against an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationEntry {
    pub id: EntryId,
    pub record_id: RecordId,
    pub currency: Currency,
    pub date: NaiveDate,

    #[serde(default)]
    pub description: String,

    pub amount: Money,

    #[serde(default)]
    pub reference: String,

    #[serde(default)]
    pub difference: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReconciliationEntry {
    pub fn new(record_id: RecordId, currency: Currency, fields: EntryFields) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            record_id,
            currency,
            date: fields.date,
            description: fields.description,
            amount: fields.amount,
            reference: fields.reference,
            difference: fields.difference,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the editable fields
    pub fn apply(&mut self, fields: EntryFields) {
        self.date = fields.date;
        self.description = fields.description;
        self.amount = fields.amount;
        self.reference = fields.reference;
        self.difference = fields.difference;
        self.updated_at = Utc::now();
    }

    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }
}
