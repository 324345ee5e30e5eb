//! File I/O utilities with atomic writes and lock files
//!
//! Writes go to a sibling temp file that is renamed over the target, so a
//! crash leaves either the old or the new content. `FileLock` serializes
//! read-modify-write cycles between processes.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CuadreError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, CuadreError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| CuadreError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| CuadreError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CuadreError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CuadreError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file must sit in the same directory for the rename to be atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| CuadreError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| CuadreError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| CuadreError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CuadreError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CuadreError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Exclusive advisory lock held through a `<file>.lock` sibling
///
/// The lock file is created with `create_new`, so only one holder can exist.
/// It is removed when the guard drops.
#[derive(Debug)]
pub struct FileLock {
    lock_path: PathBuf,
}

impl FileLock {
    const RETRY_DELAY: Duration = Duration::from_millis(50);

    /// Acquire the lock guarding `target`, retrying up to `attempts` times
    pub fn acquire(target: &Path, attempts: u32) -> Result<Self, CuadreError> {
        let lock_path = lock_path_for(target);

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        for attempt in 0..attempts.max(1) {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
            {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { lock_path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %lock_path.display(), attempt, "lock busy, retrying");
                    thread::sleep(Self::RETRY_DELAY);
                }
                Err(e) => {
                    return Err(CuadreError::Storage(format!(
                        "Failed to create lock {}: {}",
                        lock_path.display(),
                        e
                    )))
                }
            }
        }

        Err(CuadreError::Storage(format!(
            "Timed out waiting for lock {}",
            lock_path.display()
        )))
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    target.with_file_name(name)
}
