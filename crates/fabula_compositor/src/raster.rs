//! Raster operations: overlay band, cover caption, back cover.
//!
//! All coordinates derive from the page being 8.5 inches square, so the
//! same code works at any raster resolution.

use crate::font::FontSet;
use crate::layout::{self, fit_text, wrap_words};
use ab_glyph::PxScale;
use fabula_error::{CompositorError, CompositorErrorKind, FabulaResult};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::io::Cursor;

/// Page edge in inches; pages are square.
pub(crate) const PAGE_INCHES: f32 = 8.5;

/// Height of the text band in inches.
const BAND_INCHES: f32 = 2.0;

const OVERLAY_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TITLE_COLOR: Rgb<u8> = Rgb([50, 50, 100]);
const SUMMARY_COLOR: Rgb<u8> = Rgb([70, 70, 70]);

/// Darken the bottom band and render the page text into it in white.
///
/// The band covers the bottom two inches at half strength, matching the
/// soft-colored region the page prompt reserves for text.
pub(crate) fn draw_overlay_band(img: &mut RgbImage, text: &str, fonts: &FontSet) {
    let side = img.height();
    let inch = side as f32 / PAGE_INCHES;
    let band_height = (BAND_INCHES * inch) as u32;
    let band_top = side.saturating_sub(band_height);

    for y in band_top..side {
        for x in 0..img.width() {
            let pixel = img.get_pixel_mut(x, y);
            for channel in pixel.0.iter_mut() {
                *channel /= 2;
            }
        }
    }

    let max_width_pt = (img.width() as f32 - inch) / pt_to_px(1.0, inch);
    let max_height_pt = (BAND_INCHES - 1.0) * 72.0;
    let fit = fit_text(
        text,
        max_width_pt,
        max_height_pt,
        layout::MAX_OVERLAY_LINES,
        fonts.bold(),
    );

    if fit.overflow {
        tracing::warn!(len = text.len(), "Page text overflows the band at minimum size");
    }

    let size_px = pt_to_px(fit.size, inch);
    let line_height_px = pt_to_px(fit.size + layout::LINE_GAP, inch);
    let x = (0.5 * inch) as i32;
    let mut y = band_top as f32 + 0.5 * inch - size_px;

    for line in &fit.lines {
        draw_text_mut(
            img,
            OVERLAY_TEXT,
            x,
            y as i32,
            PxScale::from(size_px),
            fonts.bold(),
            line,
        );
        y += line_height_px;
    }
}

/// Stamp "A book for: {name}" in the bottom-right corner of a cover.
///
/// Takes and returns encoded PNG bytes; the cover goes straight from the
/// image model to the preview, so this is the only raster pass it gets.
pub fn add_cover_caption(
    image_bytes: &[u8],
    child_name: &str,
    fonts: &FontSet,
) -> FabulaResult<Vec<u8>> {
    let mut img = image::load_from_memory(image_bytes)
        .map_err(|e| CompositorError::new(CompositorErrorKind::ImageDecode(e.to_string())))?
        .to_rgb8();

    let caption = format!("A book for: {child_name}");
    let scale = PxScale::from(28.0);
    let (text_width, text_height) = text_size(scale, fonts.bold(), &caption);

    let margin = 20;
    let x = img.width() as i32 - text_width as i32 - margin;
    let y = img.height() as i32 - text_height as i32 - margin;
    draw_text_mut(&mut img, OVERLAY_TEXT, x.max(0), y.max(0), scale, fonts.bold(), &caption);

    encode_png(&img)
}

/// Render the gradient back cover with centered title and summary.
pub(crate) fn back_cover(side: u32, title: &str, summary: &str, fonts: &FontSet) -> RgbImage {
    let mut img = RgbImage::new(side, side);

    // Vertical gradient from pale blue to teal
    for y in 0..side {
        let ratio = y as f32 / side as f32;
        let r = (200.0 + (150.0 - 200.0) * ratio) as u8;
        let g = (220.0 + (200.0 - 220.0) * ratio) as u8;
        let b = (255.0 + (230.0 - 255.0) * ratio) as u8;
        for x in 0..side {
            img.put_pixel(x, y, Rgb([r, g, b]));
        }
    }

    // Constants below are tuned for a 612px square and scale with it
    let s = side as f32 / 612.0;

    let title_scale = PxScale::from(60.0 * s);
    let (title_width, _) = text_size(title_scale, fonts.bold(), title);
    let title_x = (side as i32 - title_width as i32) / 2;
    draw_text_mut(
        &mut img,
        TITLE_COLOR,
        title_x.max(0),
        (100.0 * s) as i32,
        title_scale,
        fonts.bold(),
        title,
    );

    let text_size_pt = 32.0 * s;
    let max_width = side as f32 - 200.0 * s;
    let lines = wrap_words(summary, max_width, text_size_pt, fonts.regular());

    let step = (45.0 * s) as i32;
    let mut y = side as i32 / 2 - (lines.len() as i32 * (40.0 * s) as i32) / 2;
    for line in &lines {
        let (line_width, _) = text_size(PxScale::from(text_size_pt), fonts.regular(), line);
        let x = (side as i32 - line_width as i32) / 2;
        draw_text_mut(
            &mut img,
            SUMMARY_COLOR,
            x.max(0),
            y,
            PxScale::from(text_size_pt),
            fonts.regular(),
            line,
        );
        y += step;
    }

    img
}

pub(crate) fn encode_png(img: &RgbImage) -> FabulaResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| CompositorError::new(CompositorErrorKind::ImageEncode(e.to_string())))?;
    Ok(buf)
}

fn pt_to_px(points: f32, inch_px: f32) -> f32 {
    points * inch_px / 72.0
}
