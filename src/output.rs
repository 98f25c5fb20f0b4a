//! Output types: per-page recognition results and the assembled document.
//!
//! Everything here is plain serialisable data. The geometry types mirror
//! what OCR engines report — lines in reading order, words within a line in
//! the engine's left-to-right order, each with an axis-aligned bounding box
//! in image pixel space. No re-sorting is performed anywhere in this crate;
//! the engine's own ordering is trusted.

use crate::error::PageError;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in image pixel space.
///
/// Serialises as a `[x, y, width, height]` array, which is the layout-JSON
/// wire format consumers of `<name>_layout.json` expect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

/// One recognised word with its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub bbox: BoundingBox,
}

/// One recognised line: text, bounding box, and its words in engine order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    pub bbox: BoundingBox,
    pub words: Vec<OcrWord>,
}

/// Raw recognition result for one page, as returned by an OCR engine.
///
/// `text` is the flattened plain text (lines joined with `\n`); `lines`
/// carries the geometry. An empty page is a valid result: zero lines and
/// an empty string, not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecognition {
    pub text: String,
    pub lines: Vec<OcrLine>,
}

impl PageRecognition {
    /// Build a recognition result from lines, deriving the plain text.
    pub fn from_lines(lines: Vec<OcrLine>) -> Self {
        let text = lines
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string();
        Self { text, lines }
    }
}

/// The per-page result of the pipeline: a successful recognition or an
/// isolated failure, always tagged with its 1-indexed page number.
///
/// Every page in the processed range yields exactly one outcome; failure
/// pages keep their position so the document output is never silently
/// incomplete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutcome {
    /// 1-indexed page number.
    pub page: usize,
    /// Rendered image width in pixels (0 when rendering failed).
    pub width: u32,
    /// Rendered image height in pixels (0 when rendering failed).
    pub height: u32,
    /// Recognised plain text (empty on failure or a blank page).
    pub text: String,
    /// Line/word geometry (empty on failure).
    pub lines: Vec<OcrLine>,
    /// Wall-clock time spent rendering + recognising this page.
    pub duration_ms: u64,
    /// `Some` when this page failed; `None` on success.
    pub error: Option<PageError>,
}

impl PageOutcome {
    pub fn success(
        page: usize,
        width: u32,
        height: u32,
        recognition: PageRecognition,
        duration_ms: u64,
    ) -> Self {
        Self {
            page,
            width,
            height,
            text: recognition.text,
            lines: recognition.lines,
            duration_ms,
            error: None,
        }
    }

    pub fn failure(page: usize, error: PageError, duration_ms: u64) -> Self {
        Self {
            page,
            width: 0,
            height: 0,
            text: String::new(),
            lines: Vec::new(),
            duration_ms,
            error: Some(error),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counters for one extraction run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Page count of the document.
    pub total_pages: usize,
    /// Pages actually processed (bounded by `max_pages`).
    pub selected_pages: usize,
    /// Pages that recognised without error.
    pub processed_pages: usize,
    /// Pages that failed to render or recognise.
    pub failed_pages: usize,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Geometry for one page in the layout artifact. Indices are 0-based in
/// the on-disk format, unlike the 1-based page numbers elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPage {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub lines: Vec<OcrLine>,
}

/// The `<name>_layout.json` payload written under `--dump-pages`.
///
/// Only successfully recognised pages carry geometry; failed pages are
/// visible in the text/markdown markers and in [`RunStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutArtifact {
    /// Source document path as given on the command line.
    pub file: String,
    /// Rendering resolution the geometry is expressed at.
    pub dpi: u32,
    /// Resolved OCR language tag.
    pub lang: String,
    pub pages: Vec<LayoutPage>,
}

/// Everything produced by one extraction run.
///
/// `text` and `markdown` are present according to the requested
/// [`crate::config::OutputFormat`]; `layout` only under dump mode. The
/// outcomes in `pages` are always in ascending page order — that ordering
/// is a correctness contract of the pipeline, not a scheduling artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Assembled plain text (page-delimited), when requested.
    pub text: Option<String>,
    /// Assembled Markdown (one section per page), when requested.
    pub markdown: Option<String>,
    /// One outcome per processed page, ascending page order.
    pub pages: Vec<PageOutcome>,
    /// Layout artifact, only under dump mode.
    pub layout: Option<LayoutArtifact>,
    /// The language tag the engine actually recognised with.
    pub resolved_language: String,
    pub stats: RunStats,
}

impl ExtractionOutput {
    /// Outcomes that failed, in page order.
    pub fn failures(&self) -> impl Iterator<Item = &PageOutcome> {
        self.pages.iter().filter(|p| !p.succeeded())
    }
}
