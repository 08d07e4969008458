//! PDF merging functionality
//!
//! Concatenates the pages of several documents, in order, into the first
//! one. Object numbers of every following document are shifted past the
//! current maximum so that nothing collides, then all objects are moved over
//! and the page tree is rebuilt.

use crate::error::{PdfToolsError, Result};
use crate::Document;
use std::path::Path;
use tracing::{info, instrument};

/// Merge documents in list order
#[instrument(skip_all)]
pub fn merge_documents(documents: impl IntoIterator<Item = Document>) -> Result<Document> {
    let mut documents = documents.into_iter();
    let mut merged = documents.next().ok_or(PdfToolsError::EmptyInput)?;
    let mut pages = merged.flatten_pages()?;
    let mut merged_count = 1;

    for document in documents {
        let mut source = document.into_inner();
        source.renumber_objects_with(merged.inner().max_id + 1);

        let mut source = Document::from(source);
        pages.extend(source.flatten_pages()?);

        let source = source.into_inner();
        let target = merged.inner_mut();
        target.max_id = target.max_id.max(source.max_id);
        target.objects.extend(source.objects);
        merged_count += 1;
    }

    merged.rebuild_page_tree(&pages)?;
    info!(documents = merged_count, pages = pages.len(), "Merged PDFs");
    Ok(merged)
}

/// Merge PDF files and save the result to `output_path`
pub fn merge_pdf_files<P: AsRef<Path>, Q: AsRef<Path>>(
    input_paths: &[P],
    output_path: Q,
) -> Result<()> {
    let documents = input_paths
        .iter()
        .map(Document::open)
        .collect::<Result<Vec<_>>>()?;
    merge_documents(documents)?.save(output_path)
}
