//! PDF assembly with lopdf.
//!
//! Every output page is a full-bleed JPEG placed on a square media box,
//! embedded as a `DCTDecode` image XObject so the compressed bytes go in
//! unchanged.

use fabula_error::{CompositorError, CompositorErrorKind, FabulaResult};
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Page edge in PDF points: 8.5 inches at 72 points per inch.
const PAGE_PT: f32 = 612.0;

/// A JPEG ready for embedding.
pub(crate) struct JpegPage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

/// Encode a raster page to JPEG at book quality.
pub(crate) fn encode_jpeg(img: &RgbImage) -> FabulaResult<JpegPage> {
    let mut data = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut data, 90);
    encoder
        .encode_image(img)
        .map_err(|e| CompositorError::new(CompositorErrorKind::ImageEncode(e.to_string())))?;

    Ok(JpegPage {
        data,
        width: img.width(),
        height: img.height(),
    })
}

/// Build the final document from front cover through back cover.
pub(crate) fn build_document(pages: &[JpegPage]) -> FabulaResult<Vec<u8>> {
    if pages.is_empty() {
        return Err(CompositorError::new(CompositorErrorKind::MissingInput(
            "no pages to assemble".to_string(),
        ))
        .into());
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());

    for page in pages {
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(page.width),
                "Height" => i64::from(page.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            page.data.clone(),
        );
        let image_id = doc.add_object(image_stream);

        // Scale the unit image square up to the full media box
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        PAGE_PT.into(),
                        0.into(),
                        0.into(),
                        PAGE_PT.into(),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec!["Im0".into()]),
                Operation::new("Q", vec![]),
            ],
        };
        let encoded = content.encode().map_err(|e| {
            CompositorError::new(CompositorErrorKind::DocumentWrite(e.to_string()))
        })?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_PT.into(), PAGE_PT.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
            },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| CompositorError::new(CompositorErrorKind::DocumentWrite(e.to_string())))?;

    tracing::debug!(pages = pages.len(), bytes = buf.len(), "Assembled document");
    Ok(buf)
}
