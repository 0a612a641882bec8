//! Asset storage trait definition.

use fabula_core::AssetHandle;
use fabula_error::FabulaResult;

/// Category of a stored artifact, used to segregate the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Raster images: covers, reference sheets, page illustrations
    Image,
    /// Assembled final documents
    Document,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Image => write!(f, "image"),
            AssetKind::Document => write!(f, "document"),
        }
    }
}

/// Trait for pluggable asset storage backends.
///
/// The pipeline only ever sees opaque [`AssetHandle`]s; what they resolve
/// to is the backend's business.
#[async_trait::async_trait]
pub trait AssetStore: Send + Sync {
    /// Store an artifact and return a handle to it.
    ///
    /// Storing the same bytes twice must return an equivalent handle
    /// without duplicating the data.
    async fn store(&self, data: &[u8], kind: AssetKind) -> FabulaResult<AssetHandle>;

    /// Retrieve an artifact by handle.
    async fn retrieve(&self, handle: &AssetHandle) -> FabulaResult<Vec<u8>>;

    /// Delete an artifact.
    ///
    /// Used when a regenerated cover replaces its predecessor.
    async fn delete(&self, handle: &AssetHandle) -> FabulaResult<()>;

    /// Check whether an artifact exists.
    async fn exists(&self, handle: &AssetHandle) -> FabulaResult<bool>;
}
