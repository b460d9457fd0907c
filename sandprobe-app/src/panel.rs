//! What the state commands show: the last record that loaded cleanly plus a
//! status line. A failure only changes the status; the record stays.

use sandprobe_store::{StateRecord, StateStore, StoreError};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum PanelStatus {
    Ok(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatePanel {
    pub path: String,
    pub exists: bool,
    pub record: Option<StateRecord>,
    pub status: PanelStatus,
}

impl StatePanel {
    pub fn new(store: &StateStore) -> Self {
        Self {
            path: store.path().display().to_string(),
            exists: false,
            record: None,
            status: PanelStatus::Ok(String::new()),
        }
    }

    pub async fn refresh(&mut self, store: &StateStore) {
        match store.load().await {
            Ok(loaded) => {
                self.exists = loaded.exists;
                self.record = loaded.record;
                let message = if self.exists { "loaded" } else { "no save" };
                self.succeed(message);
            }
            Err(e) => self.fail(&e),
        }
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.status = PanelStatus::Ok(message.into());
    }

    pub fn fail(&mut self, err: &StoreError) {
        tracing::warn!("State operation failed: {}", err);
        self.status = PanelStatus::Error(err.to_string());
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, PanelStatus::Error(_))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "state file: {}", self.path);
        match &self.record {
            Some(record) => {
                let _ = writeln!(out, "counter: {}", record.counter);
                let _ = writeln!(out, "timestamp: {}", record.timestamp);
            }
            None => {
                let _ = writeln!(out, "counter: -");
            }
        }
        match &self.status {
            PanelStatus::Ok(message) if message.is_empty() => {}
            PanelStatus::Ok(message) => {
                let _ = writeln!(out, "status: {message}");
            }
            PanelStatus::Error(message) => {
                let _ = writeln!(out, "error: {message}");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_error_keeps_last_record() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::in_dir(temp.path()).unwrap();
        store.save(&StateRecord::new(5, "t")).await.unwrap();

        let mut panel = StatePanel::new(&store);
        panel.refresh(&store).await;
        assert_eq!(panel.record.as_ref().map(|r| r.counter), Some(5));

        std::fs::write(store.path(), "garbage").unwrap();
        panel.refresh(&store).await;

        assert!(panel.is_error());
        assert_eq!(panel.record.as_ref().map(|r| r.counter), Some(5));
        let text = panel.render();
        assert!(text.contains("counter: 5"));
        assert!(text.contains("error: Corrupt state file"));
    }

    #[tokio::test]
    async fn test_absent_shows_no_save() {
        let temp = TempDir::new().unwrap();
        let store = StateStore::in_dir(temp.path()).unwrap();
        let mut panel = StatePanel::new(&store);

        panel.refresh(&store).await;

        assert!(!panel.exists);
        assert_eq!(panel.status, PanelStatus::Ok("no save".into()));
        assert!(panel.render().contains("counter: -"));
    }
}
