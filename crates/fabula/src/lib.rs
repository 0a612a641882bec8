//! Fabula: personalized illustrated-storybook generation.
//!
//! Turns a photo plus a few parameters into an illustrated storybook: a
//! fast premise-and-cover preview, then a full pipeline that expands the
//! narrative, renders reference sheets and page images with consistent
//! identifiers, and composes a paginated document with auto-fitting
//! overlaid text.
//!
//! This facade crate re-exports the workspace surface and carries the
//! layered configuration, tracing setup, and the CLI used by the binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod observability;
pub mod progress;

pub use config::FabulaConfig;
pub use fabula_compositor::{DocumentCompositor, FontSet};
pub use fabula_core::{Book, BookId, BookStatus, Narrative, Premise};
pub use fabula_error::{FabulaError, FabulaResult};
pub use fabula_interface::{
    BookStore, DocumentAssembler, ImageGenerator, ProgressSink, StoryGenerator,
};
pub use fabula_models::{GeminiImageGenerator, GeminiStoryGenerator};
pub use fabula_pipeline::{BookOrchestrator, RetryPolicy};
pub use fabula_rate_limit::ImageCallGate;
pub use fabula_storage::{AssetKind, AssetStore, FileSystemStorage, JsonBookStore};
