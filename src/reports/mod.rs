//! Reconciliation reporting
//!
//! `differential` holds the pure per-slot calculation; `reconciliation` runs
//! it over stored operations and renders the result.

pub mod differential;
pub mod reconciliation;

pub use differential::{compute_rows, ReportRow, SlotColumns};
pub use reconciliation::{DirectionFilter, ReconciliationReport, REPORT_HEADERS, SHEET_NAME};
