//! # pdf-tools
//!
//! Page selection, request-scoped temp files and document transformations
//! behind the PDF Tools service.
//!
//! ## Features
//!
//! - **Page selection**: parse range, order and delete lists and resolve them
//!   into bounds-checked page plans
//! - **PDF operations**: merge, split, rotate, reorder and delete pages
//! - **Conversion**: wrap raster images in single-page PDFs
//! - **Re-encoding**: parse and re-serialise documents, dropping orphaned objects
//! - **OCR**: pluggable text recognition, with a pure-Rust engine behind the
//!   `ocr` feature
//! - **Temp workspaces**: every temporary file created for a request is removed
//!   when the request ends, however it ends
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_tools::operations::{extract_pages, merge_documents};
//! use pdf_tools::{Document, RangeList, Result};
//!
//! # fn main() -> Result<()> {
//! let merged = merge_documents(vec![
//!     Document::open("a.pdf")?,
//!     Document::open("b.pdf")?,
//! ])?;
//!
//! let plan = RangeList::parse("1-2")?.resolve(merged.page_count())?;
//! extract_pages(&merged, &plan)?.save("first-two.pdf")?;
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod ocr;
pub mod operations;
pub mod pages;
pub mod upload;
pub mod workspace;

pub use document::Document;
pub use error::{PdfToolsError, Result};
pub use ocr::{ocr_text, TextRecognizer, UnavailableRecognizer};
pub use operations::Rotation;
pub use pages::{DeleteSet, OrderList, PagePlan, PageRange, PageSpec, PageSpecError, RangeList};
pub use upload::{DocumentKind, Upload, UploadedFile};
pub use workspace::TempWorkspace;

/// Current version of pdf-tools
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
