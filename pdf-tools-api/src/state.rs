//! Shared, immutable application state

use crate::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use pdf_tools::{TextRecognizer, UnavailableRecognizer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    temp_dir: PathBuf,
    max_upload_bytes: usize,
    recognizer: Arc<dyn TextRecognizer>,
}

impl AppState {
    /// State with request workspaces in `temp_dir` and OCR unavailable
    pub fn new(temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            recognizer: Arc::new(UnavailableRecognizer::default()),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.temp_dir())
            .with_max_upload_bytes(config.max_upload_bytes)
            .with_recognizer(recognizer_from_config(config))
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    pub fn recognizer(&self) -> Arc<dyn TextRecognizer> {
        Arc::clone(&self.recognizer)
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("temp_dir", &self.temp_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "ocr")]
fn recognizer_from_config(config: &ServerConfig) -> Arc<dyn TextRecognizer> {
    use pdf_tools::ocr::{OcrConfig, OcrsRecognizer};
    use tracing::{info, warn};

    let ocr_config = config
        .ocr_models
        .as_ref()
        .map(OcrConfig::from_dir)
        .unwrap_or_default();

    match OcrsRecognizer::new(&ocr_config) {
        Ok(recognizer) => {
            info!("OCR enabled");
            Arc::new(recognizer)
        }
        Err(e) => {
            warn!(error = %e, "OCR disabled");
            Arc::new(UnavailableRecognizer::new(e.to_string()))
        }
    }
}

#[cfg(not(feature = "ocr"))]
fn recognizer_from_config(_config: &ServerConfig) -> Arc<dyn TextRecognizer> {
    Arc::new(UnavailableRecognizer::default())
}
