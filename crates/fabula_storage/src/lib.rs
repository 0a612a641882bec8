//! Persistence backends for generated assets and book records.
//!
//! Two concerns live here. [`AssetStore`] holds the binary artifacts the
//! pipeline produces (cover, sheets, page images, the final document) in a
//! content-addressable filesystem layout. [`JsonBookStore`] persists the
//! book aggregate itself as one JSON file per book, implementing the
//! [`fabula_interface::BookStore`] seam that a real deployment would back
//! with a database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod book_store;
mod filesystem;
mod store;

pub use book_store::JsonBookStore;
pub use filesystem::FileSystemStorage;
pub use store::{AssetKind, AssetStore};
