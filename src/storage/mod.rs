//! Storage abstractions for post persistence.
//!
//! Two append-only tables live in one spreadsheet:
//! - Record table: header + one row per post (`recordedAt, number, status,
//!   title, deadline, selectedDate, file, url`)
//! - Error table: one `(timestamp, message)` row per failed run
//!
//! Neither table supports transactions, so a failing append may leave a
//! partial write behind; nothing here tries to roll it back.

pub mod local;
pub mod range;
pub mod sheets;

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, SecondsFormat};

use crate::auth::{SecretSource, sheets_token};
use crate::error::Result;
use crate::models::{CrawlerConfig, Post, RECORD_HEADER, StoreBackend, StoreConfig};
use crate::utils::http::create_async_client;

// Re-export for convenience
pub use local::LocalSheets;
pub use sheets::GoogleSheets;

/// Range-level access to a spreadsheet.
#[async_trait]
pub trait SheetBackend: Send + Sync {
    /// Read the cells of a range, row by row; empty if the range has no data.
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>>;

    /// Append rows after the table found at `range`.
    async fn append_rows(&self, range: &str, rows: &[Vec<String>]) -> Result<()>;
}

/// Acquires an authorized backend.
///
/// Each call loads credentials anew and returns an independent handle.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SheetBackend>>;
}

/// Timestamp written next to stored rows.
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// The append-only record table.
pub struct RecordStore {
    backend: Box<dyn SheetBackend>,
    data_range: String,
    title_range: String,
}

impl RecordStore {
    pub fn new(backend: Box<dyn SheetBackend>, config: &StoreConfig) -> Self {
        Self {
            backend,
            data_range: config.data_range_name.clone(),
            title_range: config.title_range_name.clone(),
        }
    }

    /// Titles already recorded; blank cells are ignored.
    pub async fn read_existing_titles(&self) -> Result<HashSet<String>> {
        let rows = self.backend.read_range(&self.title_range).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter(|title| !title.is_empty())
            .collect())
    }

    /// Append the header row followed by one timestamped row per post.
    ///
    /// The header goes in with every append, so it repeats once per batch.
    pub async fn append_posts(&self, posts: &[Post]) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let recorded_at = timestamp();
        let mut rows = Vec::with_capacity(posts.len() + 1);
        rows.push(RECORD_HEADER.iter().map(|h| h.to_string()).collect());
        rows.extend(posts.iter().map(|post| post.to_row(&recorded_at)));

        self.backend.append_rows(&self.data_range, &rows).await?;
        log::info!("Recorded {} post(s) in {}", posts.len(), self.data_range);
        Ok(())
    }
}

/// The append-only error table.
pub struct ErrorTable<'a> {
    backend: &'a dyn SheetBackend,
    range: &'a str,
}

impl<'a> ErrorTable<'a> {
    pub fn new(backend: &'a dyn SheetBackend, range: &'a str) -> Self {
        Self { backend, range }
    }

    /// Append one `(timestamp, message)` row.
    pub async fn append(&self, message: &str) -> Result<()> {
        let row = vec![timestamp(), message.to_string()];
        self.backend.append_rows(self.range, &[row]).await
    }
}

/// Connector choosing the backend from configuration.
pub struct SheetsConnector {
    store: StoreConfig,
    crawler: CrawlerConfig,
    secrets: Arc<dyn SecretSource>,
}

impl SheetsConnector {
    pub fn new(store: StoreConfig, crawler: CrawlerConfig, secrets: Arc<dyn SecretSource>) -> Self {
        Self {
            store,
            crawler,
            secrets,
        }
    }
}

#[async_trait]
impl StoreConnector for SheetsConnector {
    async fn connect(&self) -> Result<Box<dyn SheetBackend>> {
        match self.store.backend {
            StoreBackend::GoogleSheets => {
                let token = sheets_token(&self.store, self.secrets.as_ref()).await?;
                let client = create_async_client(&self.crawler)?;
                Ok(Box::new(GoogleSheets::new(
                    client,
                    self.store.api_base.clone(),
                    self.store.store_id.clone(),
                    token,
                )))
            }
            StoreBackend::Local => Ok(Box::new(LocalSheets::new(self.store.local_dir.clone()))),
        }
    }
}
