//! The OCR engine seam.
//!
//! The pipeline never talks to a concrete OCR implementation directly; it
//! goes through the [`OcrEngine`] trait, injected via
//! [`crate::config::ExtractionConfigBuilder::engine`]. That keeps the
//! engine swappable and lets tests substitute a scripted fake with
//! deterministic output instead of loading neural models or a platform OCR
//! service.
//!
//! Two operations make up the contract:
//!
//! 1. **Capability query** — [`OcrEngine::installed_languages`] returns the
//!    set of language tags this engine can recognise. Queried once at
//!    startup and treated as fixed for the run; language resolution
//!    (see [`crate::language`]) validates the user's tag against it before
//!    any page is processed.
//! 2. **Recognition** — [`OcrEngine::recognize`] turns one rendered page
//!    image into ordered lines and words with geometry. Lines come back in
//!    the engine's top-to-bottom reading order, words left-to-right; the
//!    pipeline trusts that ordering and never re-sorts.
//!
//! A page with no recognisable text is a *successful* empty result, not an
//! error — engines must return `Ok` with zero lines for blank pages.

use crate::output::PageRecognition;
use image::DynamicImage;
use thiserror::Error;

#[cfg(feature = "ocrs")]
mod ocrs_backend;
#[cfg(feature = "ocrs")]
pub use ocrs_backend::{OcrsBackend, OcrsModelPaths};

/// Engine-level recognition failure (engine crashed, model inference
/// failed, malformed image). Page-scoped by contract: the pipeline converts
/// this into a failure [`crate::output::PageOutcome`] and keeps going.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct EngineError(String);

impl EngineError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self(detail.into())
    }
}

/// A local OCR engine: capability query + per-image recognition.
///
/// Implementations must be `Send + Sync` — the pipeline runs recognition
/// inside `spawn_blocking` and shares the engine across the page loop.
pub trait OcrEngine: Send + Sync {
    /// Language tags this engine has recognition capabilities for.
    ///
    /// Tags are matched case-insensitively, by exact tag or base subtag
    /// (see [`crate::language::resolve`]).
    fn installed_languages(&self) -> Vec<String>;

    /// Recognise text in one rendered page image.
    ///
    /// `language` is a tag previously validated against
    /// [`installed_languages`](Self::installed_languages).
    fn recognize(
        &self,
        image: &DynamicImage,
        language: &str,
    ) -> Result<PageRecognition, EngineError>;
}
