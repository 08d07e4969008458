use crate::pages::PageSpecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfToolsError {
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("No documents to process")]
    EmptyInput,

    #[error(transparent)]
    InvalidSpec(#[from] PageSpecError),

    #[error("Invalid rotation: {0} (must be a multiple of 90)")]
    InvalidRotation(i64),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("OCR is not available: {0}")]
    OcrUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfToolsError {
    /// True for errors caused by what the caller sent rather than by the codec
    /// or the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PdfToolsError::Input(_)
                | PdfToolsError::EmptyInput
                | PdfToolsError::InvalidSpec(_)
                | PdfToolsError::InvalidRotation(_)
        )
    }

    /// True when the input bytes could not be decoded or transformed.
    pub fn is_codec_error(&self) -> bool {
        matches!(
            self,
            PdfToolsError::Pdf(_)
                | PdfToolsError::Image(_)
                | PdfToolsError::Codec(_)
                | PdfToolsError::Ocr(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PdfToolsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error as IoError, ErrorKind};

    #[test]
    fn test_error_display() {
        let error = PdfToolsError::InvalidRotation(45);
        assert_eq!(
            error.to_string(),
            "Invalid rotation: 45 (must be a multiple of 90)"
        );

        let error = PdfToolsError::EmptyInput;
        assert_eq!(error.to_string(), "No documents to process");
    }

    #[test]
    fn test_spec_error_is_transparent() {
        let error: PdfToolsError = PageSpecError::PageOutOfRange {
            page: 5,
            page_count: 3,
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Page 5 is out of range (document has 3 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = IoError::new(ErrorKind::StorageFull, "disk full");
        let error: PdfToolsError = io_error.into();
        assert!(matches!(error, PdfToolsError::Io(_)));
        assert!(!error.is_client_error());
        assert!(!error.is_codec_error());
    }

    #[test]
    fn test_error_categories() {
        assert!(PdfToolsError::EmptyInput.is_client_error());
        assert!(PdfToolsError::Input("no file".to_string()).is_client_error());
        assert!(PdfToolsError::Codec("bad xref".to_string()).is_codec_error());
        assert!(!PdfToolsError::Codec("bad xref".to_string()).is_client_error());
        assert!(!PdfToolsError::OcrUnavailable("no models".to_string()).is_codec_error());
    }
}
