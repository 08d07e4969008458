//! Page extraction
//!
//! Split, reorder and delete are all the same operation: build a new document
//! from an existing one following a [`PagePlan`]. Only the way the plan is
//! resolved differs.

use crate::error::{PdfToolsError, Result};
use crate::pages::{DeleteSet, OrderList, PagePlan, PageSpec, RangeList};
use crate::Document;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Build a document holding exactly the pages of `plan`, in plan order
#[instrument(skip_all, fields(pages = plan.len()))]
pub fn extract_pages(document: &Document, plan: &PagePlan) -> Result<Document> {
    if plan.is_empty() {
        return Err(PdfToolsError::EmptyInput);
    }

    let mut output = document.clone();
    let page_ids = output.flatten_pages()?;
    let page_count = page_ids.len();

    let selected = plan
        .iter()
        .map(|index| {
            page_ids.get(index).copied().ok_or_else(|| {
                PdfToolsError::Codec(format!(
                    "page index {index} out of bounds (document has {page_count} pages)"
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    output.rebuild_page_tree(&selected)?;
    debug!(source_pages = page_count, output_pages = selected.len(), "Pages extracted");
    Ok(output)
}

/// One document per range, in range order
pub fn split_document(document: &Document, ranges: &RangeList) -> Result<Vec<Document>> {
    ranges
        .resolve_parts(document.page_count())?
        .iter()
        .map(|plan| extract_pages(document, plan))
        .collect()
}

/// Resolve `spec` against the file at `input_path` and write the result
pub fn extract_pages_to_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    spec: &PageSpec,
    output_path: Q,
) -> Result<()> {
    let document = Document::open(input_path)?;
    let plan = spec.resolve(document.page_count())?;
    extract_pages(&document, &plan)?.save(output_path)
}

/// Split a PDF file, writing part `i` to `output_paths[i]`
pub fn split_pdf<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    ranges: &RangeList,
    output_paths: &[Q],
) -> Result<()> {
    if output_paths.len() != ranges.len() {
        return Err(PdfToolsError::Input(format!(
            "{} ranges but {} output paths",
            ranges.len(),
            output_paths.len()
        )));
    }

    let document = Document::open(input_path)?;
    let parts = split_document(&document, ranges)?;
    info!(parts = parts.len(), "Splitting PDF");

    for (mut part, path) in parts.into_iter().zip(output_paths) {
        part.save(path)?;
    }
    Ok(())
}

/// Rewrite a PDF file with its pages in the given 1-based order
pub fn reorder_pdf_pages<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    order: &OrderList,
    output_path: Q,
) -> Result<()> {
    extract_pages_to_file(input_path, &PageSpec::Order(order.clone()), output_path)
}

/// Rewrite a PDF file without the given 1-based pages
pub fn delete_pdf_pages<P: AsRef<Path>, Q: AsRef<Path>>(
    input_path: P,
    pages: &DeleteSet,
    output_path: Q,
) -> Result<()> {
    extract_pages_to_file(input_path, &PageSpec::Delete(pages.clone()), output_path)
}
