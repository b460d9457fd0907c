//! Filesystem primitives used by the prober.
//!
//! Every call surfaces the raw `io::Error` so the caller can tell "not found"
//! from "permission denied" from anything else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
            EntryKind::Other => write!(f, "other"),
        }
    }
}

/// A directory entry name exactly as the OS returned it.
///
/// Joining uses the raw name so entries that are not valid UTF-8 still
/// resolve; display and serialization use the lossy form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntryName(OsString);

impl EntryName {
    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }
}

impl AsRef<Path> for EntryName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<OsString> for EntryName {
    fn from(name: OsString) -> Self {
        Self(name)
    }
}

impl From<String> for EntryName {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl From<&str> for EntryName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl From<EntryName> for String {
    fn from(name: EntryName) -> Self {
        name.0.to_string_lossy().into_owned()
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

#[async_trait]
pub trait Filesystem: Send + Sync {
    /// Stats the path, following symlinks.
    async fn metadata(&self, path: &Path) -> io::Result<EntryKind>;

    /// Opens the path for reading without consuming it.
    async fn open(&self, path: &Path) -> io::Result<()>;

    /// Reads the whole file and returns how many bytes it held.
    async fn read_len(&self, path: &Path) -> io::Result<u64>;

    /// Entry names of a directory, sorted.
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<EntryName>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFilesystem;

#[async_trait]
impl Filesystem for TokioFilesystem {
    async fn metadata(&self, path: &Path) -> io::Result<EntryKind> {
        let meta = fs::metadata(path).await?;
        let kind = if meta.is_file() {
            EntryKind::File
        } else if meta.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Ok(kind)
    }

    async fn open(&self, path: &Path) -> io::Result<()> {
        if fs::metadata(path).await?.is_dir() {
            let mut dir = fs::read_dir(path).await?;
            dir.next_entry().await?;
        } else {
            fs::File::open(path).await?;
        }
        Ok(())
    }

    async fn read_len(&self, path: &Path) -> io::Result<u64> {
        let mut file = fs::File::open(path).await?;
        tokio::io::copy(&mut file, &mut tokio::io::sink()).await
    }

    async fn read_dir(&self, path: &Path) -> io::Result<Vec<EntryName>> {
        let mut names = Vec::new();
        let mut dir = fs::read_dir(path).await?;
        while let Some(entry) = dir.next_entry().await? {
            names.push(EntryName::from(entry.file_name()));
        }
        names.sort();
        Ok(names)
    }
}
