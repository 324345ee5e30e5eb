//! Scraper API key model
//!
//! Usage counters and health state for one third-party scraping key.
//! Files written by older releases use Spanish camelCase names or omit most
//! fields; serde aliases and defaults map them onto this struct.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScraperKey {
    pub key: String,

    /// Requests charged against this key since the last reset
    #[serde(default, alias = "uso")]
    pub usage: u32,

    #[serde(default = "Utc::now", alias = "ultimoReset")]
    pub last_reset: DateTime<Utc>,

    #[serde(
        default,
        alias = "ultimaValidacion",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_validated: Option<DateTime<Utc>>,

    /// Remaining credits reported by the provider at the last lookup
    #[serde(
        default,
        alias = "creditosReales",
        skip_serializing_if = "Option::is_none"
    )]
    pub real_credits: Option<i64>,

    #[serde(default = "default_active", alias = "activa")]
    pub active: bool,

    #[serde(default, alias = "erroresConsecutivos")]
    pub consecutive_errors: u32,
}

fn default_active() -> bool {
    true
}

impl ScraperKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            usage: 0,
            last_reset: Utc::now(),
            last_validated: None,
            real_credits: None,
            active: true,
            consecutive_errors: 0,
        }
    }

    /// First eight characters followed by an ellipsis
    pub fn masked(&self) -> String {
        mask_key(&self.key)
    }
}

/// Mask a key for logs and listings
pub fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(8).collect();
    format!("{}...", visible)
}
