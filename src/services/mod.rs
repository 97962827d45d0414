//! Service layer for the watcher.
//!
//! This module contains the collaborators the run pipeline drives:
//! - Listing fetching (`ListingFetcher`)
//! - Post extraction (`PostExtractor`)
//! - Mail notification (`SmtpNotifier`)

mod extract;
mod listing;
mod mail;

pub use extract::{MIN_CELLS, PostExtractor};
pub use listing::{ListingFetcher, ListingSource, RawDocument};
pub use mail::{MailContent, Notifier, SmtpNotifier, compose};
