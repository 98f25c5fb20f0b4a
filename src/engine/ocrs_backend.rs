//! Built-in OCR backend using the `ocrs` crate.
//!
//! `ocrs` is a pure-Rust OCR engine backed by neural network models
//! executed via `rten` — no platform OCR service or C library required.
//! Its published models are trained on Latin-script text, so the backend
//! advertises a single installed language: `en`.
//!
//! # Model Setup
//!
//! The engine requires two model files:
//!
//! - **Detection model** (`text-detection.rten`) — locates text regions.
//! - **Recognition model** (`text-recognition.rten`) — decodes characters.
//!
//! Models can be downloaded from the ocrs-models releases, or obtained
//! automatically by running the `ocrs-cli` tool once:
//!
//! ```sh
//! cargo install ocrs-cli
//! ocrs some-image.png  # downloads models to ~/.cache/ocrs/
//! ```
//!
//! The default cache directory is `$XDG_CACHE_HOME/ocrs` (typically
//! `~/.cache/ocrs`).

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ocrs::{ImageSource, OcrEngine as OcrsEngine, OcrEngineParams, TextItem};
use rten::Model;
use tracing::{debug, info};

use crate::engine::{EngineError, OcrEngine};
use crate::error::ExtractError;
use crate::output::{BoundingBox, OcrLine, OcrWord, PageRecognition};

/// Well-known filenames for the detection and recognition models.
const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

/// Default directory for cached OCR model files.
///
/// Follows the XDG Base Directory specification: `$XDG_CACHE_HOME/ocrs`,
/// falling back to `~/.cache/ocrs` when `XDG_CACHE_HOME` is unset.
fn default_model_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
        PathBuf::from(xdg).join("ocrs")
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".cache").join("ocrs")
    } else {
        PathBuf::from("ocrs-models")
    }
}

/// Locations of the two model files the backend needs.
#[derive(Debug, Clone)]
pub struct OcrsModelPaths {
    /// Path to the text-detection model file (`.rten`).
    pub detection: PathBuf,
    /// Path to the text-recognition model file (`.rten`).
    pub recognition: PathBuf,
}

impl Default for OcrsModelPaths {
    /// Paths under the default model cache directory.
    fn default() -> Self {
        let dir = default_model_dir();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }
}

impl OcrsModelPaths {
    /// Expects `dir` to contain `text-detection.rten` and
    /// `text-recognition.rten`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            detection: dir.join(DETECTION_MODEL_FILENAME),
            recognition: dir.join(RECOGNITION_MODEL_FILENAME),
        }
    }

    /// Verify that both model files exist.
    pub fn validate(&self) -> Result<(), ExtractError> {
        for path in [&self.detection, &self.recognition] {
            if !path.exists() {
                return Err(ExtractError::EngineUnavailable {
                    hint: format!(
                        "OCR model not found at {}.\n\
                         Run `ocrs-cli` once to download models, or fetch them from\n\
                         the ocrs-models releases and point OcrsModelPaths at them.",
                        path.display()
                    ),
                });
            }
        }
        Ok(())
    }
}

/// The built-in `ocrs` engine.
///
/// Model loading is the expensive step — construct once and reuse across
/// all pages of a document. The `ocrs` and `rten` crates must be compiled
/// in release mode; debug builds are 10-100x slower.
pub struct OcrsBackend {
    engine: OcrsEngine,
}

impl OcrsBackend {
    /// Load models from the given paths.
    pub fn new(paths: OcrsModelPaths) -> Result<Self, ExtractError> {
        paths.validate()?;

        info!("Loading OCR detection model");
        let detection_model = Model::load_file(&paths.detection).map_err(|err| {
            ExtractError::EngineUnavailable {
                hint: format!(
                    "failed to load detection model from {}: {}",
                    paths.detection.display(),
                    err
                ),
            }
        })?;

        info!("Loading OCR recognition model");
        let recognition_model = Model::load_file(&paths.recognition).map_err(|err| {
            ExtractError::EngineUnavailable {
                hint: format!(
                    "failed to load recognition model from {}: {}",
                    paths.recognition.display(),
                    err
                ),
            }
        })?;

        let engine = OcrsEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            ..Default::default()
        })
        .map_err(|err| ExtractError::EngineUnavailable {
            hint: format!("failed to initialise OCR engine: {}", err),
        })?;

        info!("OCR engine initialised");
        Ok(Self { engine })
    }

    /// Load models from the default cache directory.
    pub fn with_defaults() -> Result<Self, ExtractError> {
        Self::new(OcrsModelPaths::default())
    }

    /// Whether model files exist in the default cache location.
    pub fn models_available() -> bool {
        let paths = OcrsModelPaths::default();
        paths.detection.exists() && paths.recognition.exists()
    }
}

impl OcrEngine for OcrsBackend {
    fn installed_languages(&self) -> Vec<String> {
        // The published ocrs models recognise Latin-script text only.
        vec!["en".to_string()]
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        _language: &str,
    ) -> Result<PageRecognition, EngineError> {
        // ocrs expects RGB8 input.
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();

        let source = ImageSource::from_bytes(rgb.as_raw(), (width, height))
            .map_err(|err| EngineError::new(format!("invalid image ({width}x{height}): {err}")))?;

        let input = self
            .engine
            .prepare_input(source)
            .map_err(|err| EngineError::new(format!("preprocessing failed: {err}")))?;

        let word_rects = self
            .engine
            .detect_words(&input)
            .map_err(|err| EngineError::new(format!("word detection failed: {err}")))?;
        debug!(word_count = word_rects.len(), "words detected");

        let line_rects = self.engine.find_text_lines(&input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&input, &line_rects)
            .map_err(|err| EngineError::new(format!("line recognition failed: {err}")))?;

        // Keep the engine's reading order; skip lines it could not decode.
        let mut lines = Vec::with_capacity(line_texts.len());
        for line in line_texts.iter().flatten() {
            let text = line.to_string();
            if text.trim().is_empty() {
                continue;
            }

            let words = line
                .words()
                .map(|word| OcrWord {
                    text: word.to_string(),
                    bbox: rect_to_bbox(word.bounding_rect().to_f32()),
                })
                .collect();

            lines.push(OcrLine {
                text,
                bbox: rect_to_bbox(line.bounding_rect().to_f32()),
                words,
            });
        }

        debug!(line_count = lines.len(), "recognition complete");
        Ok(PageRecognition::from_lines(lines))
    }
}

fn rect_to_bbox(rect: rten_imageproc::RectF) -> BoundingBox {
    BoundingBox::new(rect.left(), rect.top(), rect.width(), rect.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_point_to_cache_dir() {
        let paths = OcrsModelPaths::default();
        let det = paths.detection.to_string_lossy().to_string();
        assert!(
            det.ends_with(DETECTION_MODEL_FILENAME),
            "detection model path should end with {DETECTION_MODEL_FILENAME}, got {det}"
        );
        let rec = paths.recognition.to_string_lossy().to_string();
        assert!(rec.ends_with(RECOGNITION_MODEL_FILENAME));
    }

    #[test]
    fn paths_from_dir() {
        let paths = OcrsModelPaths::from_dir("/tmp/my-models");
        assert_eq!(
            paths.detection,
            PathBuf::from("/tmp/my-models/text-detection.rten")
        );
        assert_eq!(
            paths.recognition,
            PathBuf::from("/tmp/my-models/text-recognition.rten")
        );
    }

    #[test]
    fn validate_missing_models_fails() {
        let paths = OcrsModelPaths::from_dir("/nonexistent/path/ocr-models");
        assert!(paths.validate().is_err());
    }
}
