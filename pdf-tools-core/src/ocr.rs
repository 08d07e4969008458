//! Text recognition on raster images
//!
//! Recognition engines sit behind [`TextRecognizer`]. With the `ocr` feature
//! enabled, [`OcrsRecognizer`] runs the pure-Rust `ocrs` engine on `rten`
//! models. Without it, or when no models are configured, callers get an
//! [`UnavailableRecognizer`] that reports OCR as unavailable instead of
//! failing at startup.
//!
//! # Model Setup
//!
//! `OcrsRecognizer` needs two model files in one directory:
//!
//! - `text-detection.rten`, which locates text regions
//! - `text-recognition.rten`, which decodes characters from those regions
//!
//! Running `ocrs-cli` once downloads both to `$XDG_CACHE_HOME/ocrs`
//! (typically `~/.cache/ocrs`), which is also the default lookup directory.

use crate::error::{PdfToolsError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Anything that can turn an image into text
pub trait TextRecognizer: Send + Sync {
    /// Recognise all text in `image`, lines separated by `\n`
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// Recognizer used when no OCR engine is available
#[derive(Debug, Clone)]
pub struct UnavailableRecognizer {
    reason: String,
}

impl UnavailableRecognizer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for UnavailableRecognizer {
    fn default() -> Self {
        Self::new("this build has no OCR engine")
    }
}

impl TextRecognizer for UnavailableRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        Err(PdfToolsError::OcrUnavailable(self.reason.clone()))
    }
}

/// Decode image bytes and run `recognizer` on them. The text is returned
/// exactly as the recognizer produced it.
#[instrument(skip_all, fields(bytes_len = data.len()))]
pub fn ocr_text(recognizer: &dyn TextRecognizer, data: &[u8]) -> Result<String> {
    let image = image::load_from_memory(data)?;
    let text = recognizer.recognize(&image)?;
    debug!(chars = text.len(), lines = text.lines().count(), "OCR complete");
    Ok(text)
}

/// Default directory for cached OCR model files.
///
/// `$XDG_CACHE_HOME/ocrs`, falling back to `~/.cache/ocrs`.
pub fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    pub detection_model_path: PathBuf,
    pub recognition_model_path: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self::from_dir(default_model_dir())
    }
}

impl OcrConfig {
    /// Expects `dir` to contain `text-detection.rten` and `text-recognition.rten`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
            recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Check that both model files exist
    pub fn validate(&self) -> Result<()> {
        for path in [&self.detection_model_path, &self.recognition_model_path] {
            if !path.exists() {
                return Err(PdfToolsError::OcrUnavailable(format!(
                    "model not found at {}; run `ocrs-cli` once to download models",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(feature = "ocr")]
pub use engine::OcrsRecognizer;

#[cfg(feature = "ocr")]
mod engine {
    use super::{OcrConfig, TextRecognizer};
    use crate::error::{PdfToolsError, Result};
    use image::DynamicImage;
    use ocrs::{ImageSource, OcrEngine, OcrEngineParams};
    use rten::Model;
    use tracing::{info, instrument};

    /// `ocrs` engine with its models loaded. Loading is the expensive step, so
    /// build one and share it.
    pub struct OcrsRecognizer {
        engine: OcrEngine,
    }

    impl OcrsRecognizer {
        #[instrument(skip_all, fields(
            detection = %config.detection_model_path.display(),
            recognition = %config.recognition_model_path.display(),
        ))]
        pub fn new(config: &OcrConfig) -> Result<Self> {
            config.validate()?;

            info!("Loading OCR models");
            let detection_model = Model::load_file(&config.detection_model_path).map_err(|e| {
                PdfToolsError::OcrUnavailable(format!("failed to load detection model: {e}"))
            })?;
            let recognition_model =
                Model::load_file(&config.recognition_model_path).map_err(|e| {
                    PdfToolsError::OcrUnavailable(format!("failed to load recognition model: {e}"))
                })?;

            let engine = OcrEngine::new(OcrEngineParams {
                detection_model: Some(detection_model),
                recognition_model: Some(recognition_model),
                ..Default::default()
            })
            .map_err(|e| PdfToolsError::OcrUnavailable(format!("failed to initialise OCR engine: {e}")))?;

            info!("OCR engine ready");
            Ok(Self { engine })
        }
    }

    impl std::fmt::Debug for OcrsRecognizer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("OcrsRecognizer").finish_non_exhaustive()
        }
    }

    impl TextRecognizer for OcrsRecognizer {
        #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
        fn recognize(&self, image: &DynamicImage) -> Result<String> {
            let rgb = image.to_rgb8();
            let (width, height) = rgb.dimensions();

            let source = ImageSource::from_bytes(rgb.as_raw(), (width, height)).map_err(|e| {
                PdfToolsError::Ocr(format!("failed to create image source ({width}x{height}): {e}"))
            })?;
            let input = self
                .engine
                .prepare_input(source)
                .map_err(|e| PdfToolsError::Ocr(format!("OCR preprocessing failed: {e}")))?;

            self.engine
                .get_text(&input)
                .map_err(|e| PdfToolsError::Ocr(format!("OCR text recognition failed: {e}")))
        }
    }
}
