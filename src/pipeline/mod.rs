//! Run pipeline for the watcher.
//!
//! - `filter_new`: Drop posts whose title is already recorded
//! - `ErrorRecorder`: Best-effort failure recording
//! - `RunOrchestrator`: One fetch → extract → filter → persist → notify run

pub mod dedup;
pub mod recorder;
pub mod run;

pub use dedup::filter_new;
pub use recorder::{ErrorRecorder, RecordOutcome};
pub use run::{RunOrchestrator, RunOutcome, RunState};
