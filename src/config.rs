//! Configuration types for PDF-to-text extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across threads and to diff two
//! runs to understand why their outputs differ.

use crate::engine::OcrEngine;
use crate::error::ExtractError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// Built via [`ExtractionConfig::builder()`] or using
/// [`ExtractionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfocr::{ExtractionConfig, OutputFormat};
///
/// let config = ExtractionConfig::builder()
///     .dpi(300)
///     .language("ko-KR")
///     .format(OutputFormat::Both)
///     .max_pages(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Rendering DPI used when rasterising each PDF page. Default: 300.
    ///
    /// Rendered pixel dimensions scale linearly with DPI relative to the
    /// page's physical size (a US-Letter page at 300 DPI is 2550 × 3300 px).
    /// 300 is the usual OCR sweet spot; drop to 150 for large pages where
    /// speed matters more, raise to 400-600 for very small print.
    pub dpi: u32,

    /// OCR language tag (BCP-47, e.g. `ko-KR`, `en-US`). Default: `en`.
    ///
    /// Normalised to the engine's capability index before use — see
    /// [`crate::language`]. An uninstalled language is a startup-fatal
    /// error, raised before any page is processed.
    pub language: String,

    /// Which document outputs to assemble. Default: [`OutputFormat::Both`].
    pub format: OutputFormat,

    /// Process at most this many pages, from page 1. Default: all pages.
    pub max_pages: Option<usize>,

    /// Output directory for written artifacts. Default: `./out`.
    ///
    /// Created on demand. Never touched under dry-run.
    pub outdir: PathBuf,

    /// Run the full pipeline (render + recognise) without writing any
    /// file, including dump-mode artifacts. Default: false.
    pub dry_run: bool,

    /// Persist per-page rendered PNGs and the layout JSON alongside the
    /// text/markdown outputs. Default: false.
    pub dump_pages: bool,

    /// Injected OCR engine. When `None`, the built-in `ocrs` backend is
    /// used (requires the `ocrs` feature and downloaded models).
    pub engine: Option<Arc<dyn OcrEngine>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            language: "en".to_string(),
            format: OutputFormat::default(),
            max_pages: None,
            outdir: PathBuf::from("./out"),
            dry_run: false,
            dump_pages: false,
            engine: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("dpi", &self.dpi)
            .field("language", &self.language)
            .field("format", &self.format)
            .field("max_pages", &self.max_pages)
            .field("outdir", &self.outdir)
            .field("dry_run", &self.dry_run)
            .field("dump_pages", &self.dump_pages)
            .field("engine", &self.engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi;
        self
    }

    pub fn language(mut self, tag: impl Into<String>) -> Self {
        self.config.language = tag.into();
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn outdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.outdir = dir.into();
        self
    }

    pub fn dry_run(mut self, v: bool) -> Self {
        self.config.dry_run = v;
        self
    }

    pub fn dump_pages(mut self, v: bool) -> Self {
        self.config.dump_pages = v;
        self
    }

    pub fn engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.engine = Some(engine);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if c.dpi == 0 {
            return Err(ExtractError::InvalidConfig(
                "--dpi must be a positive integer".into(),
            ));
        }
        if c.max_pages == Some(0) {
            return Err(ExtractError::InvalidConfig(
                "--max-pages must be a positive integer when provided".into(),
            ));
        }
        if c.language.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "--lang must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Which document-level outputs to assemble and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Plain text only (`<name>.txt`).
    Text,
    /// Markdown only (`<name>.md`).
    Markdown,
    /// Both text and markdown. (default)
    #[default]
    Both,
}

impl OutputFormat {
    pub fn wants_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn wants_markdown(self) -> bool {
        matches!(self, OutputFormat::Markdown | OutputFormat::Both)
    }
}

impl FromStr for OutputFormat {
    type Err = ExtractError;

    /// Accepts `text`, `md`, `both` and the aliases `txt`, `plain`,
    /// `markdown` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" | "plain" => Ok(OutputFormat::Text),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "both" => Ok(OutputFormat::Both),
            other => Err(ExtractError::InvalidConfig(format!(
                "--fmt must be one of: text, md, both (aliases: txt, markdown); got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Text => "text",
            OutputFormat::Markdown => "md",
            OutputFormat::Both => "both",
        };
        f.write_str(s)
    }
}
