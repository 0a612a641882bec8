//! Trait definitions for the pipeline's external collaborators.

use crate::{ImageRequest, PremiseRequest};
use async_trait::async_trait;
use fabula_core::{Book, BookId, Narrative, Premise};
use fabula_error::FabulaResult;

/// Text generation capability: premise creation and narrative expansion.
///
/// Implementations must tolerate malformed structured output from the
/// underlying model: missing fields are defaulted and unusable responses
/// fall back to a synthetic story rather than a hard failure. The
/// orchestrator still conforms the returned narrative (page count, id
/// renumbering) and never trusts the shape verbatim.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Produce a minimal story seed from the photo and submission metadata.
    ///
    /// Fast path: title, theme, summary, world description, and the
    /// protagonist's physical description. No pages, no secondary cast.
    async fn minimal_premise(&self, request: &PremiseRequest) -> FabulaResult<Premise>;

    /// Expand a premise into the full structured narrative with
    /// `page_count` pages and numbered cast/object/scene lists.
    async fn expand_story(&self, premise: &Premise, page_count: u8) -> FabulaResult<Narrative>;
}

/// Image generation capability.
///
/// Treated as uniformly fallible: the retry wrapper makes no distinction
/// between quota, content-policy, and transient network failures.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate a single raster image from a prompt plus reference images.
    async fn generate_image(&self, request: &ImageRequest) -> FabulaResult<Vec<u8>>;
}

/// Fire-and-forget progress sink consumed by external polling.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Record the book's current step label and 0-100 completion.
    async fn set_progress(&self, book_id: &BookId, step: &str, percent: u8);
}

/// Persistence for the book aggregate.
///
/// The real application keeps books in a database behind this seam; the
/// workspace ships a JSON-file store and tests use an in-memory map.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Load a book by id.
    async fn load(&self, book_id: &BookId) -> FabulaResult<Book>;

    /// Persist the full aggregate.
    async fn save(&self, book: &Book) -> FabulaResult<()>;
}

/// Final document assembly.
///
/// Inputs are complete by construction: the all-or-nothing completion
/// guarantee means no missing page image ever reaches this stage.
#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    /// Compose cover, page spreads, and back cover into one document.
    ///
    /// `pages` holds one decoded-image byte buffer per narrative page, in
    /// page order. Returns the serialized document bytes.
    async fn assemble(
        &self,
        narrative: &Narrative,
        cover: &[u8],
        pages: &[Vec<u8>],
    ) -> FabulaResult<Vec<u8>>;
}
