//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod correction;
pub mod entry;
pub mod keys;
pub mod operation;
pub mod report;

pub use audit::handle_audit_command;
pub use correction::{handle_correction_command, CorrectionCommands};
pub use entry::{handle_entry_command, EntryCommands};
pub use keys::{handle_key_command, KeyCommands};
pub use operation::{handle_operation_command, OperationCommands};
pub use report::{handle_report_command, ReportCommands, ReportFormat};
