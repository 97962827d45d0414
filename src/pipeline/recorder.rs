//! Best-effort error recording.

use std::sync::Arc;

use crate::error::Result;
use crate::storage::{ErrorTable, StoreConnector};

/// What happened to a recorded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded,
    /// The row could not be written; carries the reason.
    Dropped(String),
}

/// Appends run failures to the error table.
///
/// Every call connects anew, so a failure caused by a broken store handle
/// or expired credentials does not carry over into recording.
pub struct ErrorRecorder {
    connector: Arc<dyn StoreConnector>,
    range: String,
}

impl ErrorRecorder {
    pub fn new(connector: Arc<dyn StoreConnector>, range: impl Into<String>) -> Self {
        Self {
            connector,
            range: range.into(),
        }
    }

    /// Record `message`. Never fails; a write problem is logged and dropped.
    pub async fn record(&self, message: &str) -> RecordOutcome {
        match self.try_record(message).await {
            Ok(()) => {
                log::info!("Recorded failure in {}", self.range);
                RecordOutcome::Recorded
            }
            Err(e) => {
                log::error!("Could not record failure '{}': {}", message, e);
                RecordOutcome::Dropped(e.to_string())
            }
        }
    }

    async fn try_record(&self, message: &str) -> Result<()> {
        let backend = self.connector.connect().await?;
        ErrorTable::new(backend.as_ref(), &self.range)
            .append(message)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::{LocalSheets, SheetBackend};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct LocalConnector(PathBuf);

    #[async_trait]
    impl StoreConnector for LocalConnector {
        async fn connect(&self) -> Result<Box<dyn SheetBackend>> {
            Ok(Box::new(LocalSheets::new(self.0.clone())))
        }
    }

    struct DeniedConnector;

    #[async_trait]
    impl StoreConnector for DeniedConnector {
        async fn connect(&self) -> Result<Box<dyn SheetBackend>> {
            Err(AppError::auth("token expired"))
        }
    }

    #[tokio::test]
    async fn test_record_appends_row() {
        let tmp = TempDir::new().unwrap();
        let recorder = ErrorRecorder::new(
            Arc::new(LocalConnector(tmp.path().to_path_buf())),
            "Errors!A1",
        );

        let outcome = recorder.record("Parse error: listing table not found").await;
        assert_eq!(outcome, RecordOutcome::Recorded);

        let rows = LocalSheets::new(tmp.path()).read_range("Errors").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "Parse error: listing table not found");
    }

    #[tokio::test]
    async fn test_connect_failure_is_dropped() {
        let recorder = ErrorRecorder::new(Arc::new(DeniedConnector), "Errors!A1");

        match recorder.record("Fetch error: timeout").await {
            RecordOutcome::Dropped(reason) => assert!(reason.contains("token expired")),
            other => panic!("expected Dropped, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_overlong_column_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let recorder = ErrorRecorder::new(
            Arc::new(LocalConnector(tmp.path().to_path_buf())),
            "Errors!ZZZZZZZZZZZZZZZZ1",
        );

        match recorder.record("Fetch error: boom").await {
            RecordOutcome::Dropped(reason) => assert!(reason.contains("out of range")),
            other => panic!("expected Dropped, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_range_is_dropped() {
        let tmp = TempDir::new().unwrap();
        let recorder =
            ErrorRecorder::new(Arc::new(LocalConnector(tmp.path().to_path_buf())), "!A0");

        assert!(matches!(
            recorder.record("boom").await,
            RecordOutcome::Dropped(_)
        ));
    }
}
