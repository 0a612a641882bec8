//! Google Gemini REST client.

mod image;
mod parse;
mod text;
mod wire;

pub use image::GeminiImageGenerator;
pub use text::GeminiStoryGenerator;

/// Default text model.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default image model.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const API_KEY_VAR: &str = "GEMINI_API_KEY";
