//! Google Sheets storage implementation.
//!
//! Talks to the Sheets REST API v4 directly:
//! - `GET  /v4/spreadsheets/{id}/values/{range}` for range reads
//! - `POST /v4/spreadsheets/{id}/values/{range}:append` for appends
//!
//! Authorization is a bearer token obtained outside this module.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::storage::SheetBackend;

/// `ValueRange` as returned by `values.get`.
#[derive(Debug, Deserialize)]
struct ValueRange {
    /// Absent when the range holds no data
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Request body for `values.append`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendRequest<'a> {
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// Sheets API backend for one spreadsheet.
pub struct GoogleSheets {
    client: Client,
    api_base: String,
    spreadsheet_id: String,
    token: String,
}

impl GoogleSheets {
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            token: token.into(),
        }
    }

    /// `{api_base}/v4/spreadsheets/{id}/values/{range}{suffix}` with the range
    /// percent-encoded as a single path segment.
    fn values_url(&self, range: &str, suffix: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| AppError::store(format!("invalid api_base '{}': {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::store(format!("api_base '{}' cannot hold a path", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values"])
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    /// Turn a non-success response into a store error with the API message.
    async fn check(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::store(format!(
            "{action} failed with {status}: {}",
            body.trim()
        )))
    }
}

#[async_trait]
impl SheetBackend for GoogleSheets {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.values_url(range, "")?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[("majorDimension", "ROWS")])
            .send()
            .await
            .map_err(|e| AppError::store(format!("reading {range}: {e}")))?;

        let response = Self::check(response, &format!("reading {range}")).await?;
        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| AppError::store(format!("decoding {range}: {e}")))?;
        Ok(value_range.values)
    }

    async fn append_rows(&self, range: &str, rows: &[Vec<String>]) -> Result<()> {
        let url = self.values_url(range, ":append")?;
        let body = AppendRequest {
            major_dimension: "ROWS",
            values: rows,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::store(format!("appending to {range}: {e}")))?;

        Self::check(response, &format!("appending to {range}")).await?;
        log::debug!("Appended {} row(s) to {range}", rows.len());
        Ok(())
    }
}
