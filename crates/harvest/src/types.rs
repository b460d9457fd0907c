use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::fs::{EntryKind, EntryName};

/// What a probe attempts against its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbeKind {
    Existence,
    Permission,
    Content,
    /// List the directory, then probe `<entry>/<child>` for every entry.
    Enumerate { child: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTarget {
    pub name: String,
    pub group: String,
    #[serde(serialize_with = "serialize_path_lossy")]
    pub path: PathBuf,
    pub probe: ProbeKind,
}

// Fanned-out paths may carry entry names that are not valid UTF-8.
fn serialize_path_lossy<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

impl ProbeTarget {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        probe: ProbeKind,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            path: path.into(),
            probe,
        }
    }

    pub fn label(&self) -> String {
        format!("{}: {}", self.group, self.name)
    }
}

/// OS error identity carried by every failed probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode {
    pub kind: String,
    pub errno: Option<i32>,
}

impl ErrorCode {
    pub fn from_io(err: &io::Error) -> Self {
        Self {
            kind: format!("{:?}", err.kind()),
            errno: err.raw_os_error(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errno {
            Some(errno) => write!(f, "{} (os error {})", self.kind, errno),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// What a successful probe established.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum Access {
    Exists { entry: EntryKind },
    Permitted,
    Read { bytes: u64 },
    Listed { entries: Vec<EntryName> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Accessible(Access),
    Blocked { code: ErrorCode },
    Missing { code: ErrorCode },
    Unknown { code: ErrorCode, message: String },
}

impl ProbeOutcome {
    /// Maps an I/O failure onto the outcome space.
    ///
    /// Permission-class errors are `Blocked`, not-found and not-a-directory
    /// errors are `Missing`, everything else is `Unknown`.
    pub fn classify(err: &io::Error) -> Self {
        let code = ErrorCode::from_io(err);
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeOutcome::Blocked { code },
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {
                ProbeOutcome::Missing { code }
            }
            _ => ProbeOutcome::Unknown {
                code,
                message: err.to_string(),
            },
        }
    }

    pub fn is_accessible(&self) -> bool {
        matches!(self, ProbeOutcome::Accessible(_))
    }

    pub fn listed_entries(&self) -> Option<&[EntryName]> {
        match self {
            ProbeOutcome::Accessible(Access::Listed { entries }) => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Accessible(Access::Exists { entry }) => write!(f, "exists ({entry})"),
            ProbeOutcome::Accessible(Access::Permitted) => write!(f, "openable"),
            ProbeOutcome::Accessible(Access::Read { bytes }) => write!(f, "read {bytes} bytes"),
            ProbeOutcome::Accessible(Access::Listed { entries }) => {
                write!(f, "listed {} entries", entries.len())
            }
            ProbeOutcome::Blocked { code } => write!(f, "blocked: {code}"),
            ProbeOutcome::Missing { code } => write!(f, "not found: {code}"),
            ProbeOutcome::Unknown { code, message } => write!(f, "failed: {code}: {message}"),
        }
    }
}
