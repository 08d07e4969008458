//! Pass-through re-encoding
//!
//! Parses and re-serialises a document, dropping objects nothing refers to.
//! Streams keep their existing filters; no image is re-sampled.

use crate::error::Result;
use crate::Document;
use std::path::Path;
use tracing::{info, instrument};

/// Copy of `document` without unreferenced objects, renumbered densely
#[instrument(skip_all)]
pub fn reencode(document: &Document) -> Result<Document> {
    let mut output = document.clone();
    let inner = output.inner_mut();
    let before = inner.objects.len();
    let pruned = inner.prune_objects();
    inner.renumber_objects();
    info!(
        objects_before = before,
        objects_pruned = pruned.len(),
        "PDF re-encoded"
    );
    Ok(output)
}

/// Re-encode a PDF file
pub fn reencode_pdf_file<P: AsRef<Path>, Q: AsRef<Path>>(input_path: P, output_path: Q) -> Result<()> {
    let document = Document::open(input_path)?;
    reencode(&document)?.save(output_path)
}
