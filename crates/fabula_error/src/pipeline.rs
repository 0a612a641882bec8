//! Generation pipeline error types.

/// Kinds of pipeline errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// The book is not in the state required for the requested transition
    #[display("Invalid state for {}: book is {}", operation, status)]
    InvalidState {
        /// Operation that was requested
        operation: String,
        /// Current book status
        status: String,
    },
    /// A pipeline run is already active for this book
    #[display("A generation run is already in progress for book {}", _0)]
    AlreadyRunning(String),
    /// A required prior artifact is missing
    #[display("Missing required artifact: {}", _0)]
    MissingArtifact(String),
    /// All retry attempts for an asset were exhausted
    #[display("Retries exhausted for {}", _0)]
    RetriesExhausted(String),
    /// One or more page images failed all retries
    #[display("Failed pages: {}", _0)]
    FailedPages(String),
    /// Requested page number is out of range
    #[display("Invalid page number {} (book has {} pages)", page, total)]
    InvalidPage {
        /// Requested page number
        page: u32,
        /// Total pages in the book
        total: u32,
    },
}

/// Pipeline error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::FailedPages("7".to_string()));
/// assert!(format!("{}", err).contains("7"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The kind of error that occurred
    pub kind: PipelineErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
