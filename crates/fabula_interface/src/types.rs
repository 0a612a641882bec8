//! Shared request types for the capability traits.

use serde::{Deserialize, Serialize};

/// Aspect ratio hint passed with an image request.
///
/// Covers and page illustrations are square; reference sheets are wide so
/// several labeled entries fit side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum AspectRatio {
    /// 1:1, used for covers and page illustrations
    #[display("1:1")]
    Square,
    /// 16:9, used for reference sheets
    #[display("16:9")]
    Wide,
}

/// A reference image attached to an image-generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageInput {
    /// MIME type, e.g. "image/png"
    pub mime: String,
    /// Raw image bytes
    pub data: Vec<u8>,
}

impl ImageInput {
    /// Convenience constructor for PNG data.
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            mime: "image/png".to_string(),
            data,
        }
    }

    /// Convenience constructor for JPEG data.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            mime: "image/jpeg".to_string(),
            data,
        }
    }
}

/// One image-generation request: a prompt plus reference images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Instruction prompt for the image model
    pub prompt: String,
    /// Reference images, in the order the prompt refers to them
    pub references: Vec<ImageInput>,
    /// Requested aspect ratio
    pub aspect_ratio: AspectRatio,
}

impl ImageRequest {
    /// Build a request with no reference images.
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            prompt: prompt.into(),
            references: Vec::new(),
            aspect_ratio,
        }
    }

    /// Attach a reference image.
    pub fn with_reference(mut self, reference: ImageInput) -> Self {
        self.references.push(reference);
        self
    }
}

/// Input to minimal-premise generation: the reference photo plus the
/// submission metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PremiseRequest {
    /// Reference photo of the child
    pub photo: ImageInput,
    /// Child's name
    pub child_name: String,
    /// Child's age in years
    pub age: u8,
    /// Free-text interests; an empty string means "magical adventures"
    pub interests: String,
}
