//! Font loading and glyph-backed text measurement.

use crate::layout::TextMeasurer;
use ab_glyph::{FontVec, PxScale};
use fabula_error::{CompositorError, CompositorErrorKind, FabulaResult};
use std::path::Path;

/// Directories probed for the DejaVu faces when no explicit path is given.
const FONT_DIRS: [&str; 3] = [
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
];

/// The two faces used across the book: bold for overlay text, titles, and
/// the cover caption, regular for the back-cover summary.
pub struct FontSet {
    bold: FontVec,
    regular: FontVec,
}

impl FontSet {
    /// Load both faces from explicit files.
    pub fn load(bold_path: impl AsRef<Path>, regular_path: impl AsRef<Path>) -> FabulaResult<Self> {
        Ok(Self {
            bold: load_face(bold_path.as_ref())?,
            regular: load_face(regular_path.as_ref())?,
        })
    }

    /// Probe well-known system directories for the DejaVu faces.
    pub fn load_default() -> FabulaResult<Self> {
        for dir in FONT_DIRS {
            let dir = Path::new(dir);
            let bold = dir.join("DejaVuSans-Bold.ttf");
            let regular = dir.join("DejaVuSans.ttf");
            if bold.exists() && regular.exists() {
                return Self::load(bold, regular);
            }
        }

        Err(CompositorError::new(CompositorErrorKind::FontUnavailable(
            "DejaVu faces not found in any known font directory".to_string(),
        ))
        .into())
    }

    /// Bold face.
    pub fn bold(&self) -> &FontVec {
        &self.bold
    }

    /// Regular face.
    pub fn regular(&self) -> &FontVec {
        &self.regular
    }
}

fn load_face(path: &Path) -> FabulaResult<FontVec> {
    let data = std::fs::read(path).map_err(|e| {
        CompositorError::new(CompositorErrorKind::FontUnavailable(format!(
            "{}: {}",
            path.display(),
            e
        )))
    })?;

    FontVec::try_from_vec(data).map_err(|e| {
        CompositorError::new(CompositorErrorKind::FontUnavailable(format!(
            "{}: {}",
            path.display(),
            e
        )))
        .into()
    })
}

impl TextMeasurer for FontVec {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let (width, _) = imageproc::drawing::text_size(PxScale::from(size), self, text);
        width as f32
    }
}
