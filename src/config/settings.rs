//! User settings for cuadre
//!
//! Manages paging defaults, date formats, export naming, and the scraper key
//! rotation policy.

use serde::{Deserialize, Serialize};

use super::paths::CuadrePaths;
use crate::error::CuadreError;

/// Thresholds governing scraper key rotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPolicy {
    /// Usage count at which a key stops being handed out
    #[serde(default = "default_usage_limit")]
    pub usage_limit: u32,

    /// Monthly request quota of a single key
    #[serde(default = "default_monthly_quota")]
    pub monthly_quota: u32,

    /// Consecutive failures before a key is disabled
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Remaining credits required to reactivate a key on monthly reset
    #[serde(default = "default_reset_min_credits")]
    pub reset_min_credits: i64,

    /// Remaining credits required to keep a key active on sync
    #[serde(default = "default_sync_min_credits")]
    pub sync_min_credits: i64,

    /// Pause between remote credit lookups, in milliseconds
    #[serde(default = "default_validation_pause_ms")]
    pub validation_pause_ms: u64,
}

fn default_usage_limit() -> u32 {
    950
}

fn default_monthly_quota() -> u32 {
    1000
}

fn default_max_consecutive_errors() -> u32 {
    5
}

fn default_reset_min_credits() -> i64 {
    50
}

fn default_sync_min_credits() -> i64 {
    10
}

fn default_validation_pause_ms() -> u64 {
    1000
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            usage_limit: default_usage_limit(),
            monthly_quota: default_monthly_quota(),
            max_consecutive_errors: default_max_consecutive_errors(),
            reset_min_credits: default_reset_min_credits(),
            sync_min_credits: default_sync_min_credits(),
            validation_pause_ms: default_validation_pause_ms(),
        }
    }
}

/// User settings for cuadre
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Page size used when the caller gives none
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// File name of the reconciliation workbook
    #[serde(default = "default_export_file_name")]
    pub export_file_name: String,

    /// Format accepted for entry dates (strftime)
    #[serde(default = "default_entry_date_format")]
    pub entry_date_format: String,

    /// Format used when printing dates
    #[serde(default = "default_display_date_format")]
    pub display_date_format: String,

    /// Scraper key rotation thresholds
    #[serde(default)]
    pub key_policy: KeyPolicy,

    /// Base URL of the scraping provider's account endpoint
    #[serde(default = "default_credits_api_url")]
    pub credits_api_url: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_export_file_name() -> String {
    "cuadre-operaciones.xlsx".to_string()
}

fn default_entry_date_format() -> String {
    "%d/%m/%Y".to_string()
}

fn default_display_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_credits_api_url() -> String {
    "https://api.scraperapi.com".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_page_size: default_page_size(),
            export_file_name: default_export_file_name(),
            entry_date_format: default_entry_date_format(),
            display_date_format: default_display_date_format(),
            key_policy: KeyPolicy::default(),
            credits_api_url: default_credits_api_url(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_create(paths: &CuadrePaths) -> Result<Self, CuadreError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| CuadreError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                CuadreError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            if settings.default_page_size == 0 {
                return Err(CuadreError::Config(
                    "default_page_size must be greater than zero".into(),
                ));
            }

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CuadrePaths) -> Result<(), CuadreError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CuadreError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CuadreError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_page_size, 10);
        assert_eq!(settings.entry_date_format, "%d/%m/%Y");
        assert_eq!(settings.key_policy.usage_limit, 950);
        assert_eq!(settings.key_policy.max_consecutive_errors, 5);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CuadrePaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_page_size = 25;
        settings.key_policy.validation_pause_ms = 0;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_page_size, 25);
        assert_eq!(loaded.key_policy.validation_pause_ms, 0);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CuadrePaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"default_page_size": 5}"#).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_page_size, 5);
        assert_eq!(loaded.export_file_name, "cuadre-operaciones.xlsx");
        assert_eq!(loaded.key_policy, KeyPolicy::default());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CuadrePaths::with_base_dir(temp_dir.path().to_path_buf());
        std::fs::write(paths.settings_file(), r#"{"default_page_size": 0}"#).unwrap();

        let result = Settings::load_or_create(&paths);
        assert!(matches!(result, Err(CuadreError::Config(_))));
    }
}
