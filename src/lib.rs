//! # pdfocr
//!
//! Extract text from PDF documents with a local OCR engine — no network,
//! no cloud service. Each page is rasterised with pdfium, recognised by
//! the engine, and the per-page results are reassembled into plain-text
//! and Markdown documents (plus an optional layout-JSON artifact with
//! line/word geometry).
//!
//! ## Pipeline
//!
//! ```text
//! PDF file ──▶ validate ──▶ render page ──▶ recognise ──▶ assemble ──▶ write
//!              (%PDF magic,  (pdfium,        (OcrEngine    (txt / md /  (outdir,
//!               language)     dpi-linear)     trait)        layout)      atomic)
//! ```
//!
//! Pages are processed in ascending order and every processed page yields
//! exactly one [`PageOutcome`] — a failed page is recorded in place, never
//! dropped, so the assembled document is always positionally complete.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfocr::{extract, ExtractionConfig, OutputFormat};
//!
//! # async fn run() -> Result<(), pdfocr::ExtractError> {
//! let config = ExtractionConfig::builder()
//!     .dpi(300)
//!     .language("en")
//!     .format(OutputFormat::Both)
//!     .build()?;
//!
//! let output = extract("document.pdf", &config).await?;
//! println!("{}", output.text.unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom OCR Engines
//!
//! The pipeline is engine-agnostic: implement [`OcrEngine`] and inject it
//! via [`ExtractionConfig::builder()`]. The built-in backend (behind the
//! default `ocrs` feature) runs the pure-Rust `ocrs` models locally.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod language;
pub mod output;
pub mod pipeline;

pub use config::{ExtractionConfig, ExtractionConfigBuilder, OutputFormat};
pub use engine::{EngineError, OcrEngine};
#[cfg(feature = "ocrs")]
pub use engine::{OcrsBackend, OcrsModelPaths};
pub use error::{ExtractError, PageError};
pub use extract::{extract, extract_sync, extract_to_dir};
pub use output::{
    BoundingBox, ExtractionOutput, LayoutArtifact, LayoutPage, OcrLine, OcrWord, PageOutcome,
    PageRecognition, RunStats,
};
