//! Image to PDF conversion
//!
//! The image becomes a single page sized in points to its pixel dimensions,
//! with the pixels embedded as one Flate-compressed `DeviceRGB` XObject.

use crate::error::{PdfToolsError, Result};
use crate::Document;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::DynamicImage;
use lopdf::{Dictionary, Object, Stream};
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

const IMAGE_NAME: &str = "Im0";

/// Decode raster image bytes and wrap the image in a one-page PDF
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn image_to_pdf(data: &[u8]) -> Result<Document> {
    let image = image::load_from_memory(data)?;
    image_to_document(&image)
}

/// Wrap an already decoded image in a one-page PDF
pub fn image_to_document(image: &DynamicImage) -> Result<Document> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(PdfToolsError::Codec(format!(
            "image has no pixels ({width}x{height})"
        )));
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw())?;
    let pixels = encoder.finish()?;

    let mut doc = lopdf::Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let image_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(i64::from(width))),
        ("Height", Object::Integer(i64::from(height))),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
        ("Filter", Object::Name(b"FlateDecode".to_vec())),
    ]);
    let mut image_stream = Stream::new(image_dict, pixels);
    // Already compressed
    image_stream.allows_compression = false;
    let image_id = doc.add_object(image_stream);

    let content = format!("q {width} 0 0 {height} 0 0 cm /{IMAGE_NAME} Do Q");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let xobjects = Dictionary::from_iter(vec![(IMAGE_NAME, Object::Reference(image_id))]);
    let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);

    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(i64::from(width)),
                Object::Integer(i64::from(height)),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    let page_id = doc.add_object(page);

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(1)),
        ("Kids", Object::Array(vec![Object::Reference(page_id)])),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]);
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    debug!(width, height, "Image converted to PDF page");
    Ok(Document::from(doc))
}

/// Convert an image file to a one-page PDF file
pub fn image_file_to_pdf<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    output_path: Q,
) -> Result<()> {
    let data = std::fs::read(input_path)?;
    image_to_pdf(&data)?.save(output_path)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Encode a solid-colour image of the given size
    pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 30, 30])));
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }
}
