//! First-run setup of the data directory

use crate::config::{CuadrePaths, Settings};
use crate::error::CuadreError;

use super::file_io::write_json_atomic;

/// Create the directory layout, settings and empty data files
///
/// Existing files are left untouched. Returns the paths that were created.
pub fn initialize_storage(
    paths: &CuadrePaths,
    settings: &Settings,
) -> Result<Vec<std::path::PathBuf>, CuadreError> {
    paths.ensure_directories()?;

    let mut created = Vec::new();

    if !paths.settings_file().exists() {
        settings.save(paths)?;
        created.push(paths.settings_file());
    }

    let empty_files = [
        (paths.customers_file(), serde_json::json!({ "customers": [] })),
        (paths.operations_file(), serde_json::json!({ "operations": [] })),
        (
            paths.reconciliations_file(),
            serde_json::json!({ "records": [], "entries": [] }),
        ),
        (paths.scraper_keys_file(), serde_json::json!([])),
    ];

    for (path, empty) in empty_files {
        if !path.exists() {
            write_json_atomic(&path, &empty)?;
            created.push(path);
        }
    }

    tracing::info!(base_dir = %paths.base_dir().display(), created = created.len(), "storage initialized");
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CuadrePaths::with_base_dir(temp_dir.path().to_path_buf());
        let settings = Settings::default();

        let created = initialize_storage(&paths, &settings).unwrap();
        assert_eq!(created.len(), 5);
        assert!(paths.operations_file().exists());
        assert!(paths.scraper_keys_file().exists());
        assert!(paths.is_initialized());

        let again = initialize_storage(&paths, &settings).unwrap();
        assert!(again.is_empty());
    }
}
