//! Core data models for cuadre
//!
//! Operations and their customers, reconciliation records with USD/PEN
//! entries, and scraper API keys.

pub mod customer;
pub mod ids;
pub mod money;
pub mod operation;
pub mod reconciliation;
pub mod scraper_key;

pub use customer::Customer;
pub use ids::{CustomerId, EntryId, OperationId, RecordId};
pub use money::{Money, MoneyParseError};
pub use operation::{CashFlow, Direction, Operation};
pub use reconciliation::{Currency, EntryFields, ReconciliationEntry, ReconciliationRecord};
pub use scraper_key::{mask_key, ScraperKey};
