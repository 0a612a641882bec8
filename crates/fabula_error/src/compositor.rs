//! Document compositor error types.

/// Kinds of compositor errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CompositorErrorKind {
    /// A page or cover image could not be decoded
    #[display("Failed to decode image: {}", _0)]
    ImageDecode(String),
    /// An image could not be re-encoded for embedding
    #[display("Failed to encode image: {}", _0)]
    ImageEncode(String),
    /// No usable font could be loaded
    #[display("Font unavailable: {}", _0)]
    FontUnavailable(String),
    /// The assembled document could not be serialized
    #[display("Failed to write document: {}", _0)]
    DocumentWrite(String),
    /// Required input was missing
    #[display("Missing compositor input: {}", _0)]
    MissingInput(String),
}

/// Compositor error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Compositor Error: {} at line {} in {}", kind, line, file)]
pub struct CompositorError {
    /// The kind of error that occurred
    pub kind: CompositorErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CompositorError {
    /// Create a new CompositorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompositorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
