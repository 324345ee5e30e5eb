//! Storage layer for cuadre
//!
//! JSON file storage with atomic writes and automatic directory creation.
//! `Storage` owns one repository per entity file plus the audit log.

pub mod customers;
pub mod file_io;
pub mod init;
pub mod operations;
pub mod reconciliations;

pub use customers::CustomerRepository;
pub use file_io::{read_json, write_json_atomic, FileLock};
pub use init::initialize_storage;
pub use operations::OperationRepository;
pub use reconciliations::ReconciliationRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::CuadrePaths;
use crate::error::CuadreError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: CuadrePaths,
    pub customers: CustomerRepository,
    pub operations: OperationRepository,
    pub reconciliations: ReconciliationRepository,
    audit: AuditLogger,
}

impl Storage {
    pub fn new(paths: CuadrePaths) -> Result<Self, CuadreError> {
        paths.ensure_directories()?;

        Ok(Self {
            customers: CustomerRepository::new(paths.customers_file()),
            operations: OperationRepository::new(paths.operations_file()),
            reconciliations: ReconciliationRepository::new(paths.reconciliations_file()),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    pub fn paths(&self) -> &CuadrePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), CuadreError> {
        self.customers.load()?;
        self.operations.load()?;
        self.reconciliations.load()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), CuadreError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Log an update; the diff summary is computed from the snapshots when absent
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> Result<(), CuadreError> {
        let entry = AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        );
        let entry = match (&entry.diff_summary, &entry.before, &entry.after) {
            (None, Some(b), Some(a)) => AuditEntry {
                diff_summary: crate::audit::generate_diff(b, a),
                ..entry
            },
            _ => entry,
        };
        self.audit.log(&entry)
    }
}
