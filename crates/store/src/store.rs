//! Durable storage for one `StateRecord`.
//!
//! Saves write the whole record to `<path>.tmp`, sync it, rename it over the
//! canonical path, then sync the parent directory so the rename itself is
//! durable. Readers see either the previous record or the new one.

use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::record::{now_timestamp, StateRecord};

pub const STATE_FILE_NAME: &str = "save.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loaded {
    pub exists: bool,
    pub record: Option<StateRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedAt {
    pub saved_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Handle on the canonical state file. The store assumes a single writer.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(StoreError::InvalidArgument("empty state path".into()));
        }
        if path.file_name().is_none() {
            return Err(StoreError::InvalidArgument(format!(
                "state path has no file name: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        Self::new(dir.as_ref().join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    pub async fn load(&self) -> Result<Loaded, StoreError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("No state file at {:?}", self.path);
                return Ok(Loaded {
                    exists: false,
                    record: None,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let value: Value = serde_json::from_slice(&raw).map_err(|e| self.corrupt(e.to_string()))?;
        let record = StateRecord::validate(&value).map_err(|reason| self.corrupt(reason))?;

        tracing::debug!("Loaded state record {:?} from {:?}", record, self.path);
        Ok(Loaded {
            exists: true,
            record: Some(record),
        })
    }

    /// Validates an untyped candidate, then saves it.
    pub async fn save_value(&self, candidate: &Value) -> Result<SavedAt, StoreError> {
        let record = StateRecord::validate(candidate).map_err(StoreError::InvalidRecord)?;
        self.save(&record).await
    }

    pub async fn save(&self, record: &StateRecord) -> Result<SavedAt, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_vec_pretty(record)?;
        let temp_path = self.temp_path();
        if let Err(e) = write_synced(&temp_path, &content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        sync_parent(&self.path).await?;

        tracing::info!("Saved state record (counter {}) to {:?}", record.counter, self.path);
        Ok(SavedAt {
            saved_at: now_timestamp(),
        })
    }

    pub async fn delete(&self) -> Result<Deleted, StoreError> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::info!("Deleted state file {:?}", self.path);
                Ok(Deleted { deleted: true })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Deleted { deleted: false }),
            Err(e) => Err(e.into()),
        }
    }

    fn corrupt(&self, reason: String) -> StoreError {
        tracing::warn!("State file {:?} is corrupt: {}", self.path, reason);
        StoreError::CorruptState {
            path: self.path.clone(),
            reason,
        }
    }
}

async fn write_synced(path: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}

#[cfg(unix)]
async fn sync_parent(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = fs::File::open(parent).await?;
    dir.sync_all().await
}

// Windows cannot open a directory as a file.
#[cfg(not(unix))]
async fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}

/// Load, bump the counter, stamp the time, save.
///
/// An absent file starts from zero; a corrupt one is an error. Two callers
/// racing this on the same store can lose an increment; use
/// [`SerializedStore`] when that matters.
pub async fn increment(store: &StateStore) -> Result<StateRecord, StoreError> {
    let current = store.load().await?.record.unwrap_or_else(|| StateRecord {
        counter: 0,
        timestamp: now_timestamp(),
    });
    let next = current
        .incremented()
        .ok_or_else(|| StoreError::InvalidRecord("counter overflow".into()))?;
    store.save(&next).await?;
    Ok(next)
}

/// Serializes the load-modify-save workflow for callers sharing one store.
#[derive(Debug)]
pub struct SerializedStore {
    inner: Mutex<StateStore>,
}

impl SerializedStore {
    pub fn new(store: StateStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    pub async fn increment(&self) -> Result<StateRecord, StoreError> {
        let store = self.inner.lock().await;
        increment(&store).await
    }

    pub async fn load(&self) -> Result<Loaded, StoreError> {
        let store = self.inner.lock().await;
        store.load().await
    }
}
