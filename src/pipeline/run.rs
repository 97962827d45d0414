// src/pipeline/run.rs

//! One watcher run: fetch, extract, filter, persist and notify.
//!
//! The run moves through [`RunState`] strictly in order. Any error ends it in
//! `Failed`, at which point the failure is handed to the [`ErrorRecorder`]
//! over a freshly acquired store backend.

use std::fmt;
use std::sync::Arc;

use crate::auth::SecretSource;
use crate::error::Result;
use crate::models::{Config, StoreConfig};
use crate::pipeline::dedup::filter_new;
use crate::pipeline::recorder::{ErrorRecorder, RecordOutcome};
use crate::services::{ListingFetcher, ListingSource, Notifier, PostExtractor, SmtpNotifier};
use crate::storage::{RecordStore, SheetsConnector, StoreConnector};

/// Stage of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Fetching,
    Extracting,
    /// Connecting to the store, reading recorded titles and dropping known posts
    Filtering,
    /// Appending new posts, then sending the notification
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Fetching => "fetching",
            RunState::Extracting => "extracting",
            RunState::Filtering => "filtering",
            RunState::Persisting => "persisting",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Done {
        extracted: usize,
        new_posts: usize,
    },
    Failed {
        /// Stage the error came from
        stage: RunState,
        message: String,
        recorded: RecordOutcome,
    },
}

impl RunOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }
}

/// Drives a single run over its collaborators.
pub struct RunOrchestrator {
    source: Box<dyn ListingSource>,
    extractor: PostExtractor,
    connector: Arc<dyn StoreConnector>,
    notifier: Box<dyn Notifier>,
    recorder: ErrorRecorder,
    store: StoreConfig,
}

impl RunOrchestrator {
    pub fn new(
        config: &Config,
        source: Box<dyn ListingSource>,
        connector: Arc<dyn StoreConnector>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self {
            source,
            extractor: PostExtractor::new(&config.source)?,
            recorder: ErrorRecorder::new(Arc::clone(&connector), &config.store.error_range_name),
            connector,
            notifier,
            store: config.store.clone(),
        })
    }

    /// Wire up the production collaborators for `config`.
    pub fn from_config(config: &Config, secrets: Arc<dyn SecretSource>) -> Result<Self> {
        let source = ListingFetcher::new(config)?;
        let connector = SheetsConnector::new(
            config.store.clone(),
            config.crawler.clone(),
            Arc::clone(&secrets),
        );
        let notifier = SmtpNotifier::new(config.mail.clone(), secrets);

        Self::new(
            config,
            Box::new(source),
            Arc::new(connector),
            Box::new(notifier),
        )
    }

    /// Execute the run to completion. Failures are recorded, not returned.
    pub async fn run(&self) -> RunOutcome {
        let mut state = RunState::Fetching;
        log::info!("Run started ({state})");

        match self.advance(&mut state).await {
            Ok((extracted, new_posts)) => {
                transition(&mut state, RunState::Done);
                log::info!("Run complete: {extracted} extracted, {new_posts} new");
                RunOutcome::Done {
                    extracted,
                    new_posts,
                }
            }
            Err(e) => {
                let stage = state;
                transition(&mut state, RunState::Failed);
                log::error!("Run failed while {stage}: {e}");

                let message = e.to_string();
                let recorded = self.recorder.record(&message).await;
                RunOutcome::Failed {
                    stage,
                    message,
                    recorded,
                }
            }
        }
    }

    /// Steps through the stages, leaving `state` at the one that failed.
    async fn advance(&self, state: &mut RunState) -> Result<(usize, usize)> {
        let document = self.source.fetch().await?;

        transition(state, RunState::Extracting);
        let posts = self.extractor.extract(&document)?;
        let extracted = posts.len();
        log::info!("Extracted {extracted} post(s) from {}", document.url);

        transition(state, RunState::Filtering);
        let store = RecordStore::new(self.connector.connect().await?, &self.store);
        let existing = store.read_existing_titles().await?;
        let fresh = filter_new(posts, &existing);
        log::info!(
            "{} new post(s) against {} recorded title(s)",
            fresh.len(),
            existing.len()
        );

        if fresh.is_empty() {
            return Ok((extracted, 0));
        }

        transition(state, RunState::Persisting);
        store.append_posts(&fresh).await?;
        self.notifier.notify(&fresh).await?;

        Ok((extracted, fresh.len()))
    }
}

fn transition(state: &mut RunState, next: RunState) {
    log::debug!("{state} -> {next}");
    *state = next;
}
