//! Key/value storage backends for the snapshot document.
//!
//! The backend is chosen once, when the engine is composed, from
//! [`StorageConfig`]. The engine only ever sees the [`StorageBackend`] trait.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::types::config::{StorageConfig, StorageKind};
use crate::{RiasecError, RiasecResult};

/// Host storage: string values under string keys.
pub trait StorageBackend: Send + Sync {
    /// Reads a value; `None` when the key is absent.
    fn get(&self, key: &str) -> RiasecResult<Option<String>>;

    /// Writes a value atomically: readers see the old or the new value, never
    /// a partial one.
    fn set(&self, key: &str, value: &str) -> RiasecResult<()>;

    /// Short description for status output.
    fn describe(&self) -> String;
}

/// Opens the backend selected by configuration.
pub fn open_backend(config: &StorageConfig) -> RiasecResult<Box<dyn StorageBackend>> {
    match config.backend {
        StorageKind::Memory => Ok(Box::new(MemoryBackend::new())),
        StorageKind::File => Ok(Box::new(FileBackend::new(&config.path)?)),
        #[cfg(feature = "sqlite")]
        StorageKind::Sqlite => {
            if let Some(parent) = config.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            Ok(Box::new(super::sqlite::SqliteBackend::open(&config.path)?))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageKind::Sqlite => Err(RiasecError::config(
            "sqlite storage requested but the 'sqlite' feature is disabled",
        )),
    }
}

/// In-process storage. Lost when the process exits.
#[derive(Default)]
pub struct MemoryBackend {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> RiasecResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> RiasecResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// One `<key>.json` file per key inside a directory.
///
/// Writes go to a temporary file in the same directory which is then
/// renamed over the target.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Uses `dir`, creating it if needed.
    pub fn new(dir: impl AsRef<Path>) -> RiasecResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> RiasecResult<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> RiasecResult<()> {
        let target = self.path_for(key);

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&target)
            .map_err(|e| RiasecError::StorageWriteFailed(format!("{}: {}", target.display(), e)))?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("file ({})", self.dir.display())
    }
}
