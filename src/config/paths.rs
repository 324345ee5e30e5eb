//! Path management for cuadre
//!
//! ## Path Resolution Order
//!
//! 1. `CUADRE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory joined with `cuadre`
//!    (`~/.config/cuadre` on Linux, `%APPDATA%\cuadre` on Windows)

use std::path::PathBuf;

use directories::BaseDirs;

use crate::error::CuadreError;

/// Manages all paths used by cuadre
#[derive(Debug, Clone)]
pub struct CuadrePaths {
    base_dir: PathBuf,
}

impl CuadrePaths {
    /// Resolve paths from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if no home/config directory can be determined.
    pub fn new() -> Result<Self, CuadreError> {
        let base_dir = if let Ok(custom) = std::env::var("CUADRE_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding the entity files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Directory holding the scraper key registry
    pub fn keys_dir(&self) -> PathBuf {
        self.base_dir.join("keys")
    }

    /// Default directory for report exports
    pub fn exports_dir(&self) -> PathBuf {
        self.base_dir.join("exports")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn customers_file(&self) -> PathBuf {
        self.data_dir().join("customers.json")
    }

    pub fn operations_file(&self) -> PathBuf {
        self.data_dir().join("operations.json")
    }

    /// Reconciliation records and their USD/PEN entries
    pub fn reconciliations_file(&self) -> PathBuf {
        self.data_dir().join("reconciliations.json")
    }

    pub fn scraper_keys_file(&self) -> PathBuf {
        self.keys_dir().join("scraper_keys.json")
    }

    /// Snapshot written before every monthly reset
    pub fn scraper_keys_backup_file(&self) -> PathBuf {
        self.keys_dir().join("scraper_keys.backup.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), CuadreError> {
        for dir in [
            self.base_dir.clone(),
            self.data_dir(),
            self.keys_dir(),
            self.exports_dir(),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                CuadreError::Io(format!("Failed to create {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Check if cuadre has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, CuadreError> {
    let dirs = BaseDirs::new()
        .ok_or_else(|| CuadreError::Config("Could not determine home directory".into()))?;
    Ok(dirs.config_dir().join("cuadre"))
}
