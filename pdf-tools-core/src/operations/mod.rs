//! PDF operations module
//!
//! This module provides high-level operations for manipulating PDF documents
//! such as merging, splitting, rotating, reordering and deleting pages, plus
//! image conversion and pass-through re-encoding.

pub mod convert;
pub mod extract;
pub mod merge;
pub mod reencode;
pub mod rotate;

pub use convert::{image_file_to_pdf, image_to_document, image_to_pdf};
pub use extract::{
    delete_pdf_pages, extract_pages, extract_pages_to_file, reorder_pdf_pages, split_document,
    split_pdf,
};
pub use merge::{merge_documents, merge_pdf_files};
pub use reencode::{reencode, reencode_pdf_file};
pub use rotate::{rotate_all_pages, rotate_pdf_file, Rotation};
