//! The book aggregate.

use crate::{AssetHandle, BookAssets, BookStatus, Narrative, Premise, DEFAULT_PAGE_COUNT};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque unique book identifier, assigned at creation.
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
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct BookId(pub Uuid);

impl BookId {
    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

/// The aggregate root for one personalized storybook.
///
/// Created in `PreviewPending` on user submission. All subsequent mutation
/// happens through the generation orchestrator or explicit approval events.
///
/// # Examples
///
/// ```
/// use fabula_core::{Book, BookStatus};
///
/// let book = Book::submit("Mira", 6, "dragons and stars", "photos/mira.jpg");
/// assert_eq!(book.status, BookStatus::PreviewPending);
/// assert_eq!(book.progress_percentage, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, immutable after creation
    pub id: BookId,
    /// Child's name from the submission
    pub child_name: String,
    /// Child's age in years
    pub age: u8,
    /// Free-text interests used to seed the premise
    pub interests: String,
    /// Reference photo supplied at submission
    pub photo: AssetHandle,
    /// Current lifecycle status
    pub status: BookStatus,
    /// Human-readable progress label, mutated only during active generation
    pub current_step: String,
    /// 0-100, monotonically non-decreasing within a single run
    pub progress_percentage: u8,
    /// Requested number of story pages
    pub page_count: u8,
    /// Minimal story seed, persisted after preview
    pub premise: Option<Premise>,
    /// Full structured story, persisted during completion
    pub narrative: Option<Narrative>,
    /// Generated artifact handles
    pub assets: BookAssets,
    /// Populated only in an error status; cleared on successful retry
    pub error_message: Option<String>,
    /// Submission timestamp
    pub created_at: DateTime<Utc>,
    /// Set when the completion pipeline finishes
    pub completed_at: Option<DateTime<Utc>>,
}

impl Book {
    /// Create a new book from a user submission.
    pub fn submit(
        child_name: impl Into<String>,
        age: u8,
        interests: impl Into<String>,
        photo: impl Into<String>,
    ) -> Self {
        Self {
            id: BookId::generate(),
            child_name: child_name.into(),
            age,
            interests: interests.into(),
            photo: AssetHandle::new(photo),
            status: BookStatus::PreviewPending,
            current_step: String::new(),
            progress_percentage: 0,
            page_count: DEFAULT_PAGE_COUNT,
            premise: None,
            narrative: None,
            assets: BookAssets::default(),
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Record progress within the current run.
    pub fn set_progress(&mut self, step: impl Into<String>, percent: u8) {
        self.current_step = step.into();
        self.progress_percentage = percent.min(100);
    }

    /// Move to an error status with a message for the user.
    pub fn fail(&mut self, status: BookStatus, message: impl Into<String>) {
        debug_assert!(status.is_error());
        self.status = status;
        self.error_message = Some(message.into());
        self.current_step = "Generation failed".to_string();
    }

    /// Clear a previous failure on retry.
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }
}
