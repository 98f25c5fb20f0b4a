//! Error types for the pdfocr library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`ExtractError`] — **Fatal**: the extraction cannot proceed at all
//!   (bad input file, unopenable document, no OCR capability for the
//!   requested language). Returned as `Err(ExtractError)` from the
//!   top-level `extract*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (render glitch,
//!   engine hiccup) but all other pages are fine. Stored inside
//!   [`crate::output::PageOutcome`] so callers can inspect partial
//!   success rather than losing the whole document to one bad page.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first page failure, log and continue, or collect all failures for a
//! post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfocr library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Document errors ───────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF is encrypted and has no usable rendering path.
    #[error("PDF '{path}' is encrypted and cannot be rasterised.\nDecrypt it first, e.g.: qpdf --decrypt input.pdf output.pdf")]
    Encrypted { path: PathBuf },

    /// Document opened but contains no pages to process.
    #[error("PDF '{path}' contains no pages to process.")]
    NoPages { path: PathBuf },

    // ── OCR engine errors ─────────────────────────────────────────────────
    /// No OCR engine is available on this host.
    #[error("No OCR engine is available.\n{hint}")]
    EngineUnavailable { hint: String },

    /// The requested language has no installed recognition capability.
    #[error(
        "OCR language '{requested}' (normalised: '{normalized}') is not installed.\n\
         Installed languages: {}\n\
         Install the language pack for your OCR engine, or pick one of the installed tags with --lang.",
        .installed.join(", ")
    )]
    UnsupportedLanguage {
        requested: String,
        normalized: String,
        installed: Vec<String>,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the output directory or write an output file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium (https://github.com/bblanchon/pdfium-binaries) and either:\n\
  • Place libpdfium next to the executable, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir containing the library.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Process exit code for the CLI.
    ///
    /// 2 for environment/input problems, 3 for missing OCR capability,
    /// 4 for an empty document, 1 for anything else.
    pub fn exit_code(&self) -> u8 {
        match self {
            ExtractError::FileNotFound { .. }
            | ExtractError::PermissionDenied { .. }
            | ExtractError::NotAPdf { .. }
            | ExtractError::CorruptPdf { .. }
            | ExtractError::Encrypted { .. }
            | ExtractError::InvalidConfig(_)
            | ExtractError::PdfiumBindingFailed(_) => 2,
            ExtractError::EngineUnavailable { .. }
            | ExtractError::UnsupportedLanguage { .. } => 3,
            ExtractError::NoPages { .. } => 4,
            _ => 1,
        }
    }
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageOutcome`] when a page fails.
/// The overall extraction continues; the page position is preserved in
/// the document output with an inline marker.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// OCR engine failed on this page.
    #[error("Page {page}: recognition failed: {detail}")]
    RecognitionFailed { page: usize, detail: String },
}

impl PageError {
    /// The 1-indexed page number this failure belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } => *page,
            PageError::RecognitionFailed { page, .. } => *page,
        }
    }

    /// Short cause for inline markers in the document output.
    pub fn cause(&self) -> &str {
        match self {
            PageError::RenderFailed { .. } => "rasterisation failed",
            PageError::RecognitionFailed { .. } => "recognition failed",
        }
    }
}
