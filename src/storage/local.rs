//! Local filesystem spreadsheet backend.
//!
//! Keeps each sheet as a JSON grid of strings, for development and offline
//! runs. Production deployments use the Google Sheets backend.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── Posts.json            # Record table (header + rows)
//! └── Errors.json           # Error table (timestamp, message)
//! ```

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::SheetBackend;
use crate::storage::range::A1Range;

/// Local filesystem sheet backend.
#[derive(Debug, Clone)]
pub struct LocalSheets {
    root_dir: PathBuf,
}

impl LocalSheets {
    /// Create a backend rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// File holding a sheet.
    fn sheet_path(&self, sheet: &str) -> PathBuf {
        let name: String = sheet
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.root_dir.join(format!("{name}.json"))
    }

    /// Read a whole sheet, empty if it was never written.
    async fn read_sheet(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let path = self.sheet_path(sheet);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write a whole sheet atomically (write to temp, then rename).
    async fn write_sheet(&self, sheet: &str, grid: &[Vec<String>]) -> Result<()> {
        let path = self.sheet_path(sheet);
        tokio::fs::create_dir_all(&self.root_dir).await?;

        let bytes = serde_json::to_vec_pretty(grid)?;
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl SheetBackend for LocalSheets {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let range = A1Range::parse(range)?;
        let grid = self
            .read_sheet(&range.sheet)
            .await
            .map_err(|e| AppError::store(format!("reading sheet '{}': {e}", range.sheet)))?;
        Ok(range.slice(&grid))
    }

    async fn append_rows(&self, range: &str, rows: &[Vec<String>]) -> Result<()> {
        let range = A1Range::parse(range)?;
        let offset = range.append_column();

        let mut grid = self
            .read_sheet(&range.sheet)
            .await
            .map_err(|e| AppError::store(format!("reading sheet '{}': {e}", range.sheet)))?;
        grid.extend(rows.iter().map(|row| {
            let mut cells = vec![String::new(); offset];
            cells.extend(row.iter().cloned());
            cells
        }));

        self.write_sheet(&range.sheet, &grid)
            .await
            .map_err(|e| AppError::store(format!("writing sheet '{}': {e}", range.sheet)))?;
        log::debug!(
            "Appended {} row(s) to {}",
            rows.len(),
            self.sheet_path(&range.sheet).display()
        );
        Ok(())
    }
}
