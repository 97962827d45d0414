// src/services/listing.rs

//! Listing fetcher.
//!
//! Issues the single listing request of a run and hands back the raw markup.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::http::create_async_client;

/// Raw listing markup together with the URL it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub url: String,
    pub html: String,
}

/// Source of the listing document.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the listing once.
    async fn fetch(&self) -> Result<RawDocument>;
}

/// Fetches the listing over HTTP.
pub struct ListingFetcher {
    client: Client,
    url: String,
}

impl ListingFetcher {
    /// Create a fetcher for the configured listing URL.
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Ok(Self::with_client(client, config.source.listing_url()))
    }

    /// Create a fetcher with an existing client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ListingSource for ListingFetcher {
    async fn fetch(&self) -> Result<RawDocument> {
        log::debug!("GET {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::fetch(format!("GET {} failed: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(format!(
                "GET {} returned {status}",
                self.url
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::fetch(format!("reading body of {} failed: {e}", self.url)))?;

        if html.trim().is_empty() {
            return Err(AppError::fetch(format!(
                "GET {} returned an empty body",
                self.url
            )));
        }

        log::debug!("Fetched {} bytes from {}", html.len(), self.url);
        Ok(RawDocument {
            url: self.url.clone(),
            html,
        })
    }
}
