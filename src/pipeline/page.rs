//! Per-page orchestration: render → recognise → outcome, with per-page
//! error isolation.
//!
//! The document handle is acquired once, shared read-only across the
//! sequential page loop, and released when this function returns — on
//! every path, fatal or not. A failure on one page never aborts the
//! others: render and recognition errors become failure
//! [`PageOutcome`]s and the loop advances. Only document-fatal conditions
//! (unopenable file, zero pages) and output-stage write failures
//! propagate as `Err`.

use crate::engine::OcrEngine;
use crate::error::{ExtractError, PageError};
use crate::output::PageOutcome;
use crate::pipeline::render;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything the page loop needs, bundled so it can be moved into
/// `spawn_blocking` in one piece.
pub(crate) struct PageLoopParams {
    pub dpi: u32,
    pub max_pages: Option<usize>,
    /// Resolved language tag (already validated against the engine).
    pub language: String,
    pub dump_pages: bool,
    pub dry_run: bool,
    pub outdir: std::path::PathBuf,
}

/// The page loop's result: outcomes in ascending page order, plus the
/// document's full page count for stats.
pub(crate) struct ProcessedDocument {
    pub total_pages: usize,
    pub outcomes: Vec<PageOutcome>,
}

/// Open the document and process every selected page in ascending order.
///
/// Blocking: call from `spawn_blocking`. Exactly one [`PageOutcome`] is
/// produced per page in `1..=min(total, max_pages)`.
pub(crate) fn process_document_blocking(
    pdf_path: &Path,
    params: &PageLoopParams,
    engine: &Arc<dyn OcrEngine>,
) -> Result<ProcessedDocument, ExtractError> {
    let pdfium = render::bind_pdfium()?;
    let document = render::load_document(&pdfium, pdf_path)?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(ExtractError::NoPages {
            path: pdf_path.to_path_buf(),
        });
    }

    let target = params
        .max_pages
        .map_or(total_pages, |max| total_pages.min(max));
    info!(
        "Processing {} page(s) (of {} total) at {} DPI",
        target, total_pages, params.dpi
    );

    let mut outcomes = Vec::with_capacity(target);
    for index in 0..target {
        outcomes.push(process_page(&pages, index, pdf_path, params, engine)?);
    }

    Ok(ProcessedDocument {
        total_pages,
        outcomes,
    })
    // `document` drops here, releasing the pdfium handle on every path.
}

/// Process one page. Render/recognition failures are converted into a
/// failure outcome; only dump-artifact write failures return `Err`.
fn process_page(
    pages: &pdfium_render::prelude::PdfPages<'_>,
    index: usize,
    pdf_path: &Path,
    params: &PageLoopParams,
    engine: &Arc<dyn OcrEngine>,
) -> Result<PageOutcome, ExtractError> {
    let page_num = index + 1;
    let started = Instant::now();

    let image = match render::render_page(pages, index, params.dpi) {
        Ok(image) => image,
        Err(detail) => {
            warn!("Page {}: rasterisation failed: {}", page_num, detail);
            return Ok(PageOutcome::failure(
                page_num,
                PageError::RenderFailed {
                    page: page_num,
                    detail,
                },
                started.elapsed().as_millis() as u64,
            ));
        }
    };

    let recognition = match engine.recognize(&image, &params.language) {
        Ok(recognition) => recognition,
        Err(e) => {
            warn!("Page {}: recognition failed: {}", page_num, e);
            return Ok(PageOutcome::failure(
                page_num,
                PageError::RecognitionFailed {
                    page: page_num,
                    detail: e.to_string(),
                },
                started.elapsed().as_millis() as u64,
            ));
        }
    };

    if params.dump_pages {
        dump_page_image(&image, pdf_path, page_num, params)?;
    }

    let elapsed = started.elapsed();
    info!(
        "Page {} processed in {:.2}s ({} lines)",
        page_num,
        elapsed.as_secs_f64(),
        recognition.lines.len()
    );

    Ok(PageOutcome::success(
        page_num,
        image.width(),
        image.height(),
        recognition,
        elapsed.as_millis() as u64,
    ))
}

/// Persist the rendered page PNG under dump mode. Suppressed entirely by
/// dry-run; a write failure is output-stage fatal, not page-scoped.
fn dump_page_image(
    image: &DynamicImage,
    pdf_path: &Path,
    page_num: usize,
    params: &PageLoopParams,
) -> Result<(), ExtractError> {
    let path = params.outdir.join(page_image_filename(pdf_path, page_num));

    if params.dry_run {
        debug!(
            "Dry-run: skipping page image dump for page {} (path would be {})",
            page_num,
            path.display()
        );
        return Ok(());
    }

    image
        .save_with_format(&path, image::ImageFormat::Png)
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: path.clone(),
            source: std::io::Error::other(e.to_string()),
        })?;
    debug!("Dumped rendered page to {}", path.display());
    Ok(())
}

/// `<stem>_page%04d.png`, 1-based page numbering.
pub(crate) fn page_image_filename(pdf_path: &Path, page_num: usize) -> String {
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    format!("{stem}_page{page_num:04}.png")
}
