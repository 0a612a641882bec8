//! Model provider clients.
//!
//! One provider today: Google Gemini over its REST `generateContent`
//! endpoint, covering both text (premise, narrative expansion) and image
//! generation. The clients implement the capability traits from
//! [`fabula_interface`] so the pipeline never depends on a provider
//! directly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gemini;

pub use gemini::{GeminiImageGenerator, GeminiStoryGenerator};
