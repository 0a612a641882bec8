//! The [`DocumentAssembler`] implementation.

use crate::document::{build_document, encode_jpeg, JpegPage};
use crate::font::FontSet;
use crate::raster;
use async_trait::async_trait;
use fabula_core::Narrative;
use fabula_error::{CompositorError, CompositorErrorKind, FabulaResult};
use fabula_interface::DocumentAssembler;
use image::imageops::FilterType;
use image::RgbImage;
use tracing::instrument;

/// Default raster resolution for a page edge, in pixels.
const DEFAULT_PAGE_PX: u32 = 1024;

/// Composes the final book document.
///
/// Page order: front cover, one spread per narrative page with the text
/// rendered into the overlay band, then the gradient back cover.
pub struct DocumentCompositor {
    fonts: FontSet,
    page_px: u32,
}

impl DocumentCompositor {
    /// Create a compositor rendering pages at the default resolution.
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            page_px: DEFAULT_PAGE_PX,
        }
    }

    /// Override the raster resolution of a page edge.
    pub fn with_page_size(mut self, page_px: u32) -> Self {
        self.page_px = page_px;
        self
    }

    /// Decode arbitrary image bytes and crop-scale them to a full page.
    fn decode_to_page(&self, bytes: &[u8]) -> FabulaResult<RgbImage> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| CompositorError::new(CompositorErrorKind::ImageDecode(e.to_string())))?;
        Ok(img
            .resize_to_fill(self.page_px, self.page_px, FilterType::Lanczos3)
            .to_rgb8())
    }
}

#[async_trait]
impl DocumentAssembler for DocumentCompositor {
    #[instrument(skip_all, fields(title = %narrative.title, pages = pages.len()))]
    async fn assemble(
        &self,
        narrative: &Narrative,
        cover: &[u8],
        pages: &[Vec<u8>],
    ) -> FabulaResult<Vec<u8>> {
        if pages.len() != narrative.pages.len() {
            return Err(CompositorError::new(CompositorErrorKind::MissingInput(
                format!(
                    "expected {} page images, got {}",
                    narrative.pages.len(),
                    pages.len()
                ),
            ))
            .into());
        }

        let mut sheets: Vec<JpegPage> = Vec::with_capacity(pages.len() + 2);
        sheets.push(encode_jpeg(&self.decode_to_page(cover)?)?);

        for (image_bytes, page) in pages.iter().zip(&narrative.pages) {
            let mut sheet = self.decode_to_page(image_bytes)?;
            raster::draw_overlay_band(&mut sheet, &page.text, &self.fonts);
            sheets.push(encode_jpeg(&sheet)?);
        }

        let back = raster::back_cover(
            self.page_px,
            &narrative.title,
            &narrative.summary,
            &self.fonts,
        );
        sheets.push(encode_jpeg(&back)?);

        build_document(&sheets)
    }
}
