//! Service layer for cuadre
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, record creation, and audit logging.

pub mod correction;
pub mod import;
pub mod operation;
pub mod reconciliation;

pub use correction::{CorrectionReport, CorrectionService};
pub use import::{ImportResult, ImportService};
pub use operation::{OperationFilter, OperationService, OperationSummary, Page};
pub use reconciliation::{EntryInput, ReconciliationService, RecordDetails};
