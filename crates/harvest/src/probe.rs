use std::io;
use std::path::Path;

use crate::fs::{EntryKind, Filesystem};
use crate::types::{Access, ErrorCode, ProbeKind, ProbeOutcome, ProbeTarget};

/// Performs one classified access attempt per call and never fails.
pub struct Prober<F: Filesystem> {
    fs: F,
}

impl<F: Filesystem> Prober<F> {
    pub fn new(fs: F) -> Self {
        Self { fs }
    }

    pub async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
        let path = target.path.as_path();
        let entry = match self.fs.metadata(path).await {
            Ok(entry) => entry,
            Err(e) => return ProbeOutcome::classify(&e),
        };

        let outcome = match &target.probe {
            ProbeKind::Existence => ProbeOutcome::Accessible(Access::Exists { entry }),
            // Opening a FIFO or device can block indefinitely.
            _ if entry == EntryKind::Other => ProbeOutcome::Unknown {
                code: ErrorCode {
                    kind: "NotARegularFile".to_string(),
                    errno: None,
                },
                message: "not a regular file or directory, left unopened".to_string(),
            },
            ProbeKind::Permission => match self.fs.open(path).await {
                Ok(()) => ProbeOutcome::Accessible(Access::Permitted),
                Err(e) => classify_after_stat(&e),
            },
            ProbeKind::Content => self.transfer(path, entry).await,
            ProbeKind::Enumerate { .. } if entry != EntryKind::Directory => {
                ProbeOutcome::Unknown {
                    code: ErrorCode {
                        kind: "NotADirectory".to_string(),
                        errno: None,
                    },
                    message: format!("expected a directory to enumerate, found {entry}"),
                }
            }
            ProbeKind::Enumerate { .. } => self.transfer(path, entry).await,
        };

        tracing::debug!("Probed {} ({}): {}", target.label(), path.display(), outcome);
        outcome
    }

    async fn transfer(&self, path: &Path, entry: EntryKind) -> ProbeOutcome {
        let result = match entry {
            EntryKind::Directory => self
                .fs
                .read_dir(path)
                .await
                .map(|entries| Access::Listed { entries }),
            EntryKind::File | EntryKind::Other => self
                .fs
                .read_len(path)
                .await
                .map(|bytes| Access::Read { bytes }),
        };
        match result {
            Ok(access) => ProbeOutcome::Accessible(access),
            Err(e) => classify_after_stat(&e),
        }
    }
}

// The path was just stat'ed successfully, so a not-found here means it
// vanished in between. That is reported as Unknown, never as Missing.
fn classify_after_stat(err: &io::Error) -> ProbeOutcome {
    match ProbeOutcome::classify(err) {
        ProbeOutcome::Missing { code } => ProbeOutcome::Unknown {
            code,
            message: format!("vanished after stat: {err}"),
        },
        other => other,
    }
}
