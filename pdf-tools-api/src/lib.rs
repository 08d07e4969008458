//! # pdf-tools-api
//!
//! REST API server for the pdf-tools library
//!

mod api;
pub mod config;
mod error;
mod form;
mod state;

pub use api::{
    app, compress_pdf, delete_pages, health_check, image_to_pdf_handler, image_to_text,
    merge_files, merge_pdfs, reorder_pdf, root, rotate_pdf, split_archive, split_first_part,
    MessageResponse, OcrResponse,
};
pub use config::{CorsConfig, ServerConfig};
pub use error::{AppError, ErrorResponse};
pub use state::AppState;
