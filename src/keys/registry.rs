//! File-backed scraper key registry
//!
//! The registry owns `scraper_keys.json`. Every mutating call takes the
//! sibling lock file, reads the array, changes it and writes it back through
//! an atomic rename before the lock is released.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::{CuadrePaths, KeyPolicy};
use crate::error::{CuadreError, CuadreResult};
use crate::models::{mask_key, ScraperKey};
use crate::storage::{read_json, write_json_atomic, FileLock};

use super::credits::CreditSource;

const LOCK_ATTEMPTS: u32 = 100;

/// What the audit log sees of a key; the secret itself is masked
#[derive(Debug, Clone, Serialize)]
struct KeySnapshot {
    key: String,
    usage: u32,
    active: bool,
    consecutive_errors: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    real_credits: Option<i64>,
}

impl From<&ScraperKey> for KeySnapshot {
    fn from(key: &ScraperKey) -> Self {
        Self {
            key: key.masked(),
            usage: key.usage,
            active: key.active,
            consecutive_errors: key.consecutive_errors,
            real_credits: key.real_credits,
        }
    }
}

/// One line of the status listing
#[derive(Debug, Clone, Serialize)]
pub struct KeyStatusLine {
    pub key: String,
    pub usage: u32,
    pub active: bool,
    pub real_credits: Option<i64>,
    pub last_validated: Option<chrono::DateTime<Utc>>,
}

/// Aggregate health of the registry
#[derive(Debug, Clone, Serialize)]
pub struct KeyStatus {
    pub total: usize,
    pub active: usize,
    pub total_usage: u64,
    pub available_credits: i64,
    /// Usage over total quota, formatted with two decimals and a `%`
    pub usage_percent: String,
    pub keys: Vec<KeyStatusLine>,
}

/// Registry of scraper API keys with usage-based rotation
pub struct KeyRegistry {
    file: PathBuf,
    backup: PathBuf,
    policy: KeyPolicy,
    audit: AuditLogger,
}

impl KeyRegistry {
    pub fn new(paths: &CuadrePaths, policy: KeyPolicy) -> Self {
        Self {
            file: paths.scraper_keys_file(),
            backup: paths.scraper_keys_backup_file(),
            policy,
            audit: AuditLogger::new(paths.audit_log()),
        }
    }

    fn load(&self) -> CuadreResult<Vec<ScraperKey>> {
        if !self.file.exists() {
            return Err(CuadreError::Storage(format!(
                "Key registry {} not found. Run 'cuadre init' first.",
                self.file.display()
            )));
        }
        read_json(&self.file)
    }

    fn lock(&self) -> CuadreResult<FileLock> {
        FileLock::acquire(&self.file, LOCK_ATTEMPTS)
    }

    fn log_change(&self, before: &ScraperKey, after: &ScraperKey) -> CuadreResult<()> {
        let (before, after) = (KeySnapshot::from(before), KeySnapshot::from(after));
        let mut entry = AuditEntry::update(
            EntityType::ScraperKey,
            before.key.clone(),
            None,
            &before,
            &after,
            None,
        );
        if let (Some(b), Some(a)) = (&entry.before, &entry.after) {
            entry.diff_summary = crate::audit::generate_diff(b, a);
        }
        self.audit.log(&entry)
    }

    /// Register a new key
    pub fn add(&self, key: &str) -> CuadreResult<ScraperKey> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CuadreError::Validation("Key cannot be empty".into()));
        }

        let _lock = self.lock()?;
        let mut keys = self.load()?;

        if keys.iter().any(|k| k.key == key) {
            return Err(CuadreError::Validation(format!(
                "Key {} is already registered",
                mask_key(key)
            )));
        }

        let entry = ScraperKey::new(key);
        keys.push(entry.clone());
        write_json_atomic(&self.file, &keys)?;

        self.audit.log(&AuditEntry::create(
            EntityType::ScraperKey,
            entry.masked(),
            None,
            &KeySnapshot::from(&entry),
        ))?;
        tracing::info!(key = %entry.masked(), "scraper key added");

        Ok(entry)
    }

    /// Hand out the least-used healthy key and charge one request to it
    pub fn acquire(&self) -> CuadreResult<String> {
        let _lock = self.lock()?;
        let mut keys = self.load()?;
        let chosen = self.acquire_in(&mut keys)?;
        write_json_atomic(&self.file, &keys)?;
        Ok(chosen)
    }

    fn acquire_in(&self, keys: &mut [ScraperKey]) -> CuadreResult<String> {
        let limit = self.policy.usage_limit;
        let max_errors = self.policy.max_consecutive_errors;

        if let Some(key) = keys
            .iter_mut()
            .filter(|k| k.active && k.usage < limit)
            .min_by_key(|k| k.usage)
        {
            key.usage += 1;
            tracing::info!(
                key = %key.masked(),
                usage = key.usage,
                quota = self.policy.monthly_quota,
                "scraper key selected"
            );
            return Ok(key.key.clone());
        }

        // No healthy key left; retry one that has failed but is not disabled
        if let Some(key) = keys
            .iter_mut()
            .filter(|k| k.consecutive_errors > 0 && k.consecutive_errors < max_errors)
            .min_by_key(|k| k.usage)
        {
            tracing::warn!(key = %key.masked(), errors = key.consecutive_errors, "using key with previous errors");
            key.consecutive_errors = 0;
            return Ok(key.key.clone());
        }

        Err(CuadreError::NoKeysAvailable(
            "every key is exhausted or disabled, check the provider dashboard".into(),
        ))
    }

    /// Record a failed request against a key
    pub fn mark_error(&self, key: &str) -> CuadreResult<ScraperKey> {
        let _lock = self.lock()?;
        let mut keys = self.load()?;
        let updated = self.mark_error_in(&mut keys, key)?;
        write_json_atomic(&self.file, &keys)?;
        Ok(updated)
    }

    fn mark_error_in(&self, keys: &mut [ScraperKey], key: &str) -> CuadreResult<ScraperKey> {
        let entry = keys
            .iter_mut()
            .find(|k| k.key == key)
            .ok_or_else(|| CuadreError::key_not_found(mask_key(key)))?;
        let before = entry.clone();

        entry.consecutive_errors += 1;
        if entry.consecutive_errors >= self.policy.max_consecutive_errors {
            entry.active = false;
            tracing::error!(key = %entry.masked(), "scraper key disabled after repeated errors");
        }

        let after = entry.clone();
        self.log_change(&before, &after)?;
        Ok(after)
    }

    /// Optionally charge an error to the current key, then acquire the next one
    pub fn rotate(&self, current: &str, error: bool) -> CuadreResult<String> {
        let _lock = self.lock()?;
        let mut keys = self.load()?;

        if error {
            match self.mark_error_in(&mut keys, current) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => {
                    tracing::warn!(key = %mask_key(current), "rotating away from unknown key");
                }
                Err(e) => return Err(e),
            }
        }

        // Persist the error count even when no key is left to hand out
        let next = self.acquire_in(&mut keys);
        write_json_atomic(&self.file, &keys)?;
        next
    }

    /// Take a key out of rotation
    pub fn deactivate(&self, key: &str) -> CuadreResult<ScraperKey> {
        let _lock = self.lock()?;
        let mut keys = self.load()?;

        let entry = keys
            .iter_mut()
            .find(|k| k.key == key)
            .ok_or_else(|| CuadreError::key_not_found(mask_key(key)))?;
        let before = entry.clone();
        entry.active = false;
        let after = entry.clone();

        write_json_atomic(&self.file, &keys)?;
        self.log_change(&before, &after)?;
        Ok(after)
    }

    pub fn status(&self) -> CuadreResult<KeyStatus> {
        let keys = self.load()?;

        let total = keys.len();
        let active = keys.iter().filter(|k| k.active).count();
        let total_usage: u64 = keys.iter().map(|k| u64::from(k.usage)).sum();
        let capacity = total as i64 * i64::from(self.policy.monthly_quota);
        let usage_percent = if capacity > 0 {
            format!("{:.2}%", total_usage as f64 / capacity as f64 * 100.0)
        } else {
            "0.00%".to_string()
        };

        Ok(KeyStatus {
            total,
            active,
            total_usage,
            available_credits: capacity - total_usage as i64,
            usage_percent,
            keys: keys
                .iter()
                .map(|k| KeyStatusLine {
                    key: k.masked(),
                    usage: k.usage,
                    active: k.active,
                    real_credits: k.real_credits,
                    last_validated: k.last_validated,
                })
                .collect(),
        })
    }

    /// Start-of-month reset from the provider's real credit counts
    ///
    /// The current file is copied to the backup first. A failed lookup keeps
    /// the old usage but leaves the key inactive.
    pub fn reset_monthly(&self, source: &dyn CreditSource) -> CuadreResult<Vec<ScraperKey>> {
        tracing::info!("monthly key reset started");
        let _lock = self.lock()?;
        let mut keys = self.load()?;
        write_json_atomic(&self.backup, &keys)?;

        let count = keys.len();
        for (idx, key) in keys.iter_mut().enumerate() {
            let before = key.clone();
            let now = Utc::now();

            match source.remaining_credits(&key.key) {
                Ok(credits) => {
                    key.usage = self.usage_from_credits(credits);
                    key.real_credits = Some(credits);
                    key.active = credits > self.policy.reset_min_credits;
                }
                Err(e) => {
                    tracing::error!(key = %key.masked(), error = %e, "credit lookup failed");
                    key.real_credits = Some(-1);
                    key.active = false;
                }
            }
            key.last_reset = now;
            key.last_validated = Some(now);
            key.consecutive_errors = 0;

            self.log_change(&before, key)?;
            tracing::info!(key = %key.masked(), credits = ?key.real_credits, "key reset");
            self.pause_between(idx, count);
        }

        write_json_atomic(&self.file, &keys)?;
        tracing::info!("monthly key reset completed");
        Ok(keys)
    }

    /// Align usage with the provider; keys whose lookup fails are left alone
    pub fn sync(&self, source: &dyn CreditSource) -> CuadreResult<Vec<ScraperKey>> {
        tracing::info!("key sync started");
        let _lock = self.lock()?;
        let mut keys = self.load()?;

        let count = keys.len();
        for (idx, key) in keys.iter_mut().enumerate() {
            match source.remaining_credits(&key.key) {
                Ok(credits) => {
                    let before = key.clone();
                    key.usage = self.usage_from_credits(credits);
                    key.last_validated = Some(Utc::now());
                    key.real_credits = Some(credits);
                    key.active = credits > self.policy.sync_min_credits;
                    self.log_change(&before, key)?;
                }
                Err(e) => {
                    tracing::warn!(key = %key.masked(), error = %e, "credit lookup failed, key unchanged");
                }
            }
            self.pause_between(idx, count);
        }

        write_json_atomic(&self.file, &keys)?;
        tracing::info!("key sync completed");
        Ok(keys)
    }

    fn usage_from_credits(&self, credits: i64) -> u32 {
        let used = (i64::from(self.policy.monthly_quota) - credits).max(0);
        u32::try_from(used).unwrap_or(u32::MAX)
    }

    fn pause_between(&self, idx: usize, count: usize) {
        if self.policy.validation_pause_ms > 0 && idx + 1 < count {
            thread::sleep(Duration::from_millis(self.policy.validation_pause_ms));
        }
    }
}
