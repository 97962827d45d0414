// src/models/mod.rs

//! Domain models for the watcher.

mod config;
mod post;

// Re-export all public types
pub use config::{
    Config, CrawlerConfig, ListingSelectors, LoggingConfig, MailConfig, SourceConfig,
    StoreBackend, StoreConfig, UrlJoin,
};
pub use post::{Post, RECORD_HEADER};
