//! Core data types for the Fabula storybook generation workspace.
//!
//! This crate defines the `Book` aggregate and the structured story types
//! that flow through the generation pipeline: the minimal [`Premise`]
//! produced for the fast preview, and the full [`Narrative`] with numbered
//! characters, objects, scenes, and pages.
//!
//! The [`conform`] pass repairs whatever shape the text model returned so
//! the rest of the pipeline can rely on two invariants: the page count is
//! exactly what was requested, and every id a page references exists in the
//! corresponding list.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod book;
mod conform;
mod status;
mod story;

pub use assets::{AssetHandle, BookAssets};
pub use book::{Book, BookId};
pub use conform::conform_narrative;
#[doc(hidden)]
pub use conform::test_support;
pub use status::BookStatus;
pub use story::{Character, Narrative, Page, Premise, Protagonist, Scene, StoryObject};

/// Maximum number of characters, objects, or scenes in a narrative.
pub const MAX_CAST_ENTRIES: usize = 3;

/// Default number of story pages in a completed book.
pub const DEFAULT_PAGE_COUNT: u8 = 12;
