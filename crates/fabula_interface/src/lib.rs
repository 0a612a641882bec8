//! Capability traits consumed by the Fabula generation pipeline.
//!
//! The orchestrator depends only on these contracts. Concrete
//! implementations live elsewhere: Gemini-backed generators in
//! `fabula_models`, filesystem stores in `fabula_storage`, the document
//! compositor in `fabula_compositor`. Tests inject mocks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{BookStore, DocumentAssembler, ImageGenerator, ProgressSink, StoryGenerator};
pub use types::{AspectRatio, ImageInput, ImageRequest, PremiseRequest};
