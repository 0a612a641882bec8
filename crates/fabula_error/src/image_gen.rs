//! Image generation error types.

/// Kinds of image generation errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ImageGenErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// API request failed
    #[display("Image generation request failed: {}", _0)]
    ApiRequest(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Response contained no image part
    #[display("No image data in model response")]
    NoImageData,
    /// Base64 decoding failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
}

/// Image generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use fabula_error::{ImageGenError, ImageGenErrorKind};
///
/// let err = ImageGenError::new(ImageGenErrorKind::NoImageData);
/// assert!(format!("{}", err).contains("No image data"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Image Error: {} at line {} in {}", kind, line, file)]
pub struct ImageGenError {
    /// The kind of error that occurred
    pub kind: ImageGenErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ImageGenError {
    /// Create a new ImageGenError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ImageGenErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
