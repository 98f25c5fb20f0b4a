//! Top-level extraction entry points.
//!
//! [`extract`] runs the full pipeline in memory; [`extract_to_dir`] adds
//! the write stage (text/markdown/layout artifacts into the configured
//! output directory); [`extract_sync`] wraps [`extract`] for callers
//! without a tokio runtime.
//!
//! Startup validation happens up front and fails fast: input file checks,
//! engine availability, and language resolution all complete before a
//! single page is rendered. The per-document page loop is CPU-bound and
//! not async-safe (pdfium), so it runs inside one
//! `tokio::task::spawn_blocking` call.

use crate::config::ExtractionConfig;
use crate::engine::OcrEngine;
use crate::error::ExtractError;
use crate::language;
use crate::output::{ExtractionOutput, RunStats};
use crate::pipeline::{assemble, page};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Run the extraction pipeline on a PDF file, returning everything in
/// memory. Writes nothing except dump-mode page images (and those only
/// when `dump_pages` is set and `dry_run` is not).
///
/// # Errors
///
/// Fatal conditions only — bad input, unopenable document, unavailable
/// engine, unsupported language, empty document, or a dump-artifact write
/// failure. Per-page render/recognition failures do not surface here; they
/// are recorded on the corresponding [`crate::output::PageOutcome`].
pub async fn extract(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    let pdf_path = pdf_path.as_ref().to_path_buf();
    let started = Instant::now();

    resolve_input(&pdf_path)?;

    let engine = resolve_engine(config)?;
    let installed = engine.installed_languages();
    if installed.is_empty() {
        return Err(ExtractError::EngineUnavailable {
            hint: "The OCR engine reports no installed languages.\n\
                   Install at least one recognition language pack."
                .to_string(),
        });
    }
    let resolved_language = language::resolve(&config.language, &installed)?;
    info!(
        "OCR language '{}' resolved to installed capability '{}'",
        config.language, resolved_language
    );

    if config.dump_pages && !config.dry_run {
        std::fs::create_dir_all(&config.outdir).map_err(|e| ExtractError::OutputWriteFailed {
            path: config.outdir.clone(),
            source: e,
        })?;
    }

    let params = page::PageLoopParams {
        dpi: config.dpi,
        max_pages: config.max_pages,
        language: resolved_language.clone(),
        dump_pages: config.dump_pages,
        dry_run: config.dry_run,
        outdir: config.outdir.clone(),
    };

    let loop_engine = Arc::clone(&engine);
    let loop_path = pdf_path.clone();
    let processed = tokio::task::spawn_blocking(move || {
        page::process_document_blocking(&loop_path, &params, &loop_engine)
    })
    .await
    .map_err(|e| ExtractError::Internal(format!("page-processing task panicked: {e}")))??;

    let outcomes = processed.outcomes;
    let failed_pages = outcomes.iter().filter(|o| !o.succeeded()).count();
    let stats = RunStats {
        total_pages: processed.total_pages,
        selected_pages: outcomes.len(),
        processed_pages: outcomes.len() - failed_pages,
        failed_pages,
        total_duration_ms: started.elapsed().as_millis() as u64,
    };

    let text = config
        .format
        .wants_text()
        .then(|| assemble::build_text(&outcomes));
    let markdown = config
        .format
        .wants_markdown()
        .then(|| assemble::build_markdown(&outcomes));
    let layout = config.dump_pages.then(|| {
        assemble::build_layout(
            &outcomes,
            &pdf_path.to_string_lossy(),
            config.dpi,
            &resolved_language,
        )
    });

    info!(
        "Extraction complete: {}/{} page(s) succeeded in {} ms",
        stats.processed_pages, stats.selected_pages, stats.total_duration_ms
    );

    Ok(ExtractionOutput {
        text,
        markdown,
        pages: outcomes,
        layout,
        resolved_language,
        stats,
    })
}

/// Run [`extract`] and write the requested artifacts into the configured
/// output directory.
///
/// Output files are named after the input stem: `<stem>.txt`, `<stem>.md`,
/// and `<stem>_layout.json` under dump mode. Each file is written to a
/// temporary sibling and renamed into place, so readers never observe a
/// half-written artifact. All assembly happens before the first write;
/// under `dry_run` nothing is written and the path list is empty.
///
/// The outer `Result` is the pipeline: any fatal extraction error surfaces
/// there. The inner `Result` is the write stage only — a failed write
/// returns the fully computed [`ExtractionOutput`] alongside the
/// [`ExtractError::OutputWriteFailed`], so callers can retry the write (or
/// persist elsewhere) without re-running OCR.
pub async fn extract_to_dir(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<(ExtractionOutput, Result<Vec<PathBuf>, ExtractError>), ExtractError> {
    let pdf_path = pdf_path.as_ref();
    let output = extract(pdf_path, config).await?;

    if config.dry_run {
        debug!("Dry-run: skipping output writes");
        return Ok((output, Ok(Vec::new())));
    }

    let written = write_outputs(pdf_path, config, &output).await;
    Ok((output, written))
}

/// The write stage of [`extract_to_dir`]: persist the assembled artifacts
/// into the output directory, creating it if absent.
async fn write_outputs(
    pdf_path: &Path,
    config: &ExtractionConfig,
    output: &ExtractionOutput,
) -> Result<Vec<PathBuf>, ExtractError> {
    tokio::fs::create_dir_all(&config.outdir)
        .await
        .map_err(|e| ExtractError::OutputWriteFailed {
            path: config.outdir.clone(),
            source: e,
        })?;

    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    let mut written = Vec::new();
    if let Some(text) = &output.text {
        let path = config.outdir.join(format!("{stem}.txt"));
        write_atomic(&path, text).await?;
        written.push(path);
    }
    if let Some(markdown) = &output.markdown {
        let path = config.outdir.join(format!("{stem}.md"));
        write_atomic(&path, markdown).await?;
        written.push(path);
    }
    if let Some(layout) = &output.layout {
        let json = serde_json::to_string_pretty(layout)
            .map_err(|e| ExtractError::Internal(format!("layout serialisation failed: {e}")))?;
        let path = config.outdir.join(format!("{stem}_layout.json"));
        write_atomic(&path, &json).await?;
        written.push(path);
    }

    for path in &written {
        info!("Wrote {}", path.display());
    }
    Ok(written)
}

/// Synchronous wrapper around [`extract`] for callers without a runtime.
pub fn extract_sync(
    pdf_path: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, ExtractError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ExtractError::Internal(format!("failed to start tokio runtime: {e}")))?
        .block_on(extract(pdf_path, config))
}

/// Validate the input path before handing it to pdfium: it must exist, be
/// readable, and start with the `%PDF` magic.
fn resolve_input(path: &Path) -> Result<(), ExtractError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::Internal(format!("failed to open '{}': {e}", path.display())),
    })?;

    let mut magic = [0u8; 4];
    file.read_exact(&mut magic)
        .map_err(|_| ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic: [0; 4],
        })?;
    if &magic != b"%PDF" {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

/// Pick the engine for this run: the injected one, else the built-in
/// `ocrs` backend.
fn resolve_engine(config: &ExtractionConfig) -> Result<Arc<dyn OcrEngine>, ExtractError> {
    if let Some(engine) = &config.engine {
        return Ok(Arc::clone(engine));
    }

    #[cfg(feature = "ocrs")]
    {
        let backend = crate::engine::OcrsBackend::with_defaults()?;
        Ok(Arc::new(backend))
    }

    #[cfg(not(feature = "ocrs"))]
    {
        Err(ExtractError::EngineUnavailable {
            hint: "No OCR engine was injected and the built-in `ocrs` backend is \
                   not compiled in.\nEnable the `ocrs` feature or provide an \
                   engine via ExtractionConfig::builder().engine(..)."
                .to_string(),
        })
    }
}

/// Write `contents` to `path` via a temporary sibling and an atomic
/// rename.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), ExtractError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let tmp = path.with_file_name(format!("{file_name}.tmp"));

    let wrap = |source: std::io::Error| ExtractError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };
    tokio::fs::write(&tmp, contents).await.map_err(&wrap)?;
    tokio::fs::rename(&tmp, path).await.map_err(&wrap)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_file_not_found() {
        let err = resolve_input(Path::new("/nonexistent/input.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"GIF89a not a pdf").unwrap();
        let err = resolve_input(&path).unwrap_err();
        match err {
            ExtractError::NotAPdf { magic, .. } => assert_eq!(&magic, b"GIF8"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn truncated_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();
        assert!(matches!(
            resolve_input(&path).unwrap_err(),
            ExtractError::NotAPdf { .. }
        ));
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("real.pdf");
        std::fs::write(&path, b"%PDF-1.7\n...").unwrap();
        assert!(resolve_input(&path).is_ok());
    }

    fn sample_output() -> ExtractionOutput {
        ExtractionOutput {
            text: Some("===== Page 1 =====\nalpha\n".into()),
            markdown: Some("## Page 1\n\nalpha\n".into()),
            pages: vec![],
            layout: None,
            resolved_language: "en".into(),
            stats: RunStats::default(),
        }
    }

    #[tokio::test]
    async fn write_outputs_names_files_after_stem() {
        let dir = tempfile::tempdir().unwrap();
        let outdir = dir.path().join("out");
        let config = ExtractionConfig::builder().outdir(&outdir).build().unwrap();

        let written = write_outputs(Path::new("/tmp/report.pdf"), &config, &sample_output())
            .await
            .unwrap();
        assert_eq!(
            written,
            vec![outdir.join("report.txt"), outdir.join("report.md")]
        );
        assert_eq!(
            std::fs::read_to_string(outdir.join("report.txt")).unwrap(),
            "===== Page 1 =====\nalpha\n"
        );
    }

    #[tokio::test]
    async fn unwritable_outdir_is_output_write_failed() {
        let dir = tempfile::tempdir().unwrap();
        // A file squatting on the outdir path makes every write fail.
        let blocker = dir.path().join("out");
        std::fs::write(&blocker, b"in the way").unwrap();
        let config = ExtractionConfig::builder().outdir(&blocker).build().unwrap();

        let err = write_outputs(Path::new("doc.pdf"), &config, &sample_output())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::OutputWriteFailed { .. }));
    }

    #[tokio::test]
    async fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_atomic(&path, "hello\n").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
        assert!(!dir.path().join("out.txt.tmp").exists());
    }
}
