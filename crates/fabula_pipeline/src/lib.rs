//! Book generation pipelines.
//!
//! Two staged pipelines drive a book from submission to a finished
//! document. The preview pipeline produces a minimal premise and an
//! illustrated cover for approval; the completion pipeline expands the
//! narrative, renders the reference sheets and every page image, and
//! assembles the final document. [`BookOrchestrator`] owns the flow;
//! retries, duplicate-trigger guarding, prompt construction, and progress
//! milestones each live in their own module.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod guard;
mod orchestrator;
pub mod progress;
pub mod prompts;
mod retry;

pub use guard::{ActiveRuns, RunToken};
pub use orchestrator::BookOrchestrator;
pub use retry::{retry_asset, RetryPolicy};
