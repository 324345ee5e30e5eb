//! Display formatting for terminal output
//!
//! Provides utilities for formatting operations, reconciliation entries and
//! key status for terminal display.

pub mod keys;
pub mod operation;

pub use keys::format_key_status;
pub use operation::{format_entries, format_operation_details, format_operation_list};
