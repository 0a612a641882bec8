//! Final-document composition.
//!
//! Turns the generated artwork into the deliverable: page images with the
//! narrative text rendered into a semi-transparent band, a captioned
//! cover, a gradient back cover, and the whole sequence assembled into a
//! square PDF.
//!
//! Text layout is a pure algorithm over a [`TextMeasurer`] so it can be
//! tested without a font file; the shipped measurer is backed by ab_glyph.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod compositor;
mod document;
mod font;
mod layout;
mod raster;

pub use compositor::DocumentCompositor;
pub use font::FontSet;
pub use layout::{fit_text, wrap_words, TextFit, TextMeasurer, FONT_SIZE_CANDIDATES};
pub use raster::add_cover_caption;
