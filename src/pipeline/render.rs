//! PDF rasterisation: bind pdfium, open documents, render single pages.
//!
//! ## Why everything here is blocking
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. The whole per-document page loop therefore runs inside one
//! `tokio::task::spawn_blocking` call (see [`crate::pipeline::page`]);
//! this module only exposes blocking helpers.
//!
//! ## DPI contract
//!
//! Rendered pixel dimensions scale linearly with DPI relative to the
//! page's physical size: a page `w` points wide renders at
//! `w / 72 × dpi` pixels. No pixel cap is applied — callers control
//! memory via the `--dpi` knob directly.

use crate::error::ExtractError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::debug;

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH` (a directory containing the shared
/// library), then the executable's directory, then the system library.
pub(crate) fn bind_pdfium() -> Result<Pdfium, ExtractError> {
    let bindings = if let Ok(dir) = std::env::var("PDFIUM_LIB_PATH") {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
    } else {
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
    };

    bindings
        .map(Pdfium::new)
        .map_err(|e| ExtractError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Open a PDF document, mapping pdfium's open errors onto the fatal
/// taxonomy: encrypted documents and corrupt files are document-fatal,
/// never page-scoped.
pub(crate) fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
) -> Result<PdfDocument<'a>, ExtractError> {
    pdfium.load_pdf_from_file(pdf_path, None).map_err(|e| {
        let detail = format!("{e:?}");
        if detail.to_lowercase().contains("password") {
            ExtractError::Encrypted {
                path: pdf_path.to_path_buf(),
            }
        } else {
            ExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail,
            }
        }
    })
}

/// Render one page to an image at the given DPI.
///
/// Returns the error detail as a plain string; the caller wraps it into a
/// page-scoped [`crate::error::PageError::RenderFailed`].
pub(crate) fn render_page(
    pages: &PdfPages<'_>,
    index: usize,
    dpi: u32,
) -> Result<DynamicImage, String> {
    let page = pages
        .get(index as u16)
        .map_err(|e| format!("failed to load page: {e:?}"))?;

    // Pixel width = physical width (points, 1/72 inch) scaled by DPI.
    // Height follows proportionally from the page's aspect ratio.
    let target_width = (page.width().value / 72.0 * dpi as f32).round().max(1.0) as i32;
    let render_config = PdfRenderConfig::new().set_target_width(target_width);

    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| format!("rasterisation failed: {e:?}"))?;

    let image = bitmap.as_image();
    debug!(
        "Rendered page {} → {}x{} px at {} DPI",
        index + 1,
        image.width(),
        image.height(),
        dpi
    );

    Ok(image)
}
