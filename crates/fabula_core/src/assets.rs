//! Handles to generated artifacts.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque handle to a stored artifact.
///
/// The storage backend decides what the string means (a filesystem path for
/// the default backend). The aggregate only carries it around.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct AssetHandle(pub String);

impl AssetHandle {
    /// Create a handle from a backend-specific location string.
    pub fn new(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Backend-specific location string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Artifacts generated for one book.
///
/// Page images are kept in an explicit page-number-to-handle map so that
/// single-page regeneration never has to reconstruct the association from
/// directory listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookAssets {
    /// Illustrated cover, generated during preview
    pub cover: Option<AssetHandle>,
    /// Character/object reference sheet
    pub character_sheet: Option<AssetHandle>,
    /// Scene reference sheet
    pub scene_sheet: Option<AssetHandle>,
    /// One image per page, keyed by 1-based page number
    pub pages: BTreeMap<u32, AssetHandle>,
    /// Assembled final document
    pub document: Option<AssetHandle>,
}

impl BookAssets {
    /// Whether both reference sheets are present.
    pub fn has_sheets(&self) -> bool {
        self.character_sheet.is_some() && self.scene_sheet.is_some()
    }

    /// Whether every page in 1..=page_count has an image.
    pub fn pages_complete(&self, page_count: u8) -> bool {
        (1..=u32::from(page_count)).all(|n| self.pages.contains_key(&n))
    }
}
