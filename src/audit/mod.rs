//! Audit logging for cuadre
//!
//! Every create and update of records, entries and scraper keys is appended
//! to a JSONL audit log with before/after snapshots.
//!
//! - `AuditEntry`: one logged action with timestamp, entity and snapshots.
//! - `AuditLogger`: appends entries to the log file and reads them back.
//! - `generate_diff`: top-level field change summary between two snapshots.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{Action, AuditEntry, EntityType};
pub use logger::AuditLogger;
