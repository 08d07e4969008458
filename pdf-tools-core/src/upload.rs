//! Uploaded files and input sniffing

use std::path::Path;

/// Anything that can be persisted as a request input: a name and its bytes.
pub trait Upload {
    /// Filename as sent by the client (may be empty)
    fn filename(&self) -> &str;

    /// The full content of the upload
    fn read(&self) -> &[u8];

    /// Declared content type, if the client sent one
    fn content_type(&self) -> Option<&str> {
        None
    }

    /// Extension of the original filename including the dot, e.g. `".pdf"`
    fn extension(&self) -> String {
        Path::new(self.filename())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// In-memory upload received from a client
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// What the bytes actually are, independent of the declared type
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::sniff(&self.data)
    }
}

impl Upload for UploadedFile {
    fn filename(&self) -> &str {
        &self.filename
    }

    fn read(&self) -> &[u8] {
        &self.data
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }
}

/// Broad classification of input bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Image(image::ImageFormat),
    Unsupported,
}

impl DocumentKind {
    /// Classify by magic bytes. Images count only when the format can be
    /// decoded by this build.
    pub fn sniff(data: &[u8]) -> Self {
        // Some producers put junk before the header; readers accept it within
        // the first 1024 bytes.
        let head = &data[..data.len().min(1024)];
        if head.windows(5).any(|w| w == b"%PDF-") {
            return DocumentKind::Pdf;
        }
        match image::guess_format(data) {
            Ok(format) if format.reading_enabled() => DocumentKind::Image(format),
            _ => DocumentKind::Unsupported,
        }
    }
}
