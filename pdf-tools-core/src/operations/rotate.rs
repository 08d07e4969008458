//! PDF page rotation functionality
//!
//! Rotation is cumulative: the requested angle is added to whatever `/Rotate`
//! a page already has (its own or inherited), so rotating a page shown at 90
//! degrees by another 90 shows it at 180.

use crate::error::{PdfToolsError, Result};
use crate::Document;
use lopdf::Object;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Clockwise rotation, a multiple of 90 degrees normalised to `0..360`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation(i64);

impl Rotation {
    pub const NONE: Rotation = Rotation(0);
    pub const CLOCKWISE_90: Rotation = Rotation(90);
    pub const ROTATE_180: Rotation = Rotation(180);
    pub const CLOCKWISE_270: Rotation = Rotation(270);

    /// Create from degrees; negative values rotate counter-clockwise
    pub fn from_degrees(degrees: i64) -> Result<Self> {
        if degrees % 90 != 0 {
            return Err(PdfToolsError::InvalidRotation(degrees));
        }
        Ok(Rotation(degrees.rem_euclid(360)))
    }

    pub fn degrees(self) -> i64 {
        self.0
    }

    /// Apply this rotation on top of an existing `/Rotate` value
    pub fn apply_to(self, existing: i64) -> i64 {
        // `existing` comes straight from the file and may be any i64
        (existing.rem_euclid(360) + self.0).rem_euclid(360)
    }
}

/// Rotate every page of `document` in place
#[instrument(skip(document))]
pub fn rotate_all_pages(document: &mut Document, rotation: Rotation) -> Result<()> {
    let page_ids = document.flatten_pages()?;

    for &id in &page_ids {
        let existing = document.rotation_of(id)?;
        let updated = rotation.apply_to(existing);
        document
            .inner_mut()
            .get_dictionary_mut(id)?
            .set("Rotate", Object::Integer(updated));
        debug!(?id, existing, updated, "Page rotated");
    }

    info!(
        pages = page_ids.len(),
        degrees = rotation.degrees(),
        "Rotated all pages"
    );
    Ok(())
}

/// Rotate every page of a PDF file by `degrees` and save the result
pub fn rotate_pdf_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    degrees: i64,
    output_path: Q,
) -> Result<()> {
    let rotation = Rotation::from_degrees(degrees)?;
    let mut document = Document::open(input_path)?;
    rotate_all_pages(&mut document, rotation)?;
    document.save(output_path)
}
