//! Book lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a book.
///
/// Exactly one status is active at any time. Transitions are driven by the
/// generation orchestrator or by external approval events (payment,
/// regeneration requests) at the boundary.
///
/// # Examples
///
/// ```
/// use fabula_core::BookStatus;
///
/// assert_eq!(format!("{}", BookStatus::PreviewReady), "preview_ready");
/// assert!(BookStatus::Error.is_error());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BookStatus {
    /// Created on submission; preview not yet generated
    PreviewPending,
    /// Premise and cover are available for approval
    PreviewReady,
    /// Preview generation failed
    PreviewError,
    /// Cover regeneration is in progress
    GeneratingCover,
    /// Payment confirmed; completion not yet started
    Paid,
    /// Completion pipeline is running
    Generating,
    /// Final document exists and every page has a valid image
    Completed,
    /// Completion pipeline failed
    Error,
}

impl BookStatus {
    /// Whether this is one of the terminal error statuses.
    pub fn is_error(&self) -> bool {
        matches!(self, BookStatus::PreviewError | BookStatus::Error)
    }
}
