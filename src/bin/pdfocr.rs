//! Command-line interface for pdfocr.
//!
//! Thin wrapper over the library: parse flags, build an
//! [`ExtractionConfig`], run [`pdfocr::extract_to_dir`], and map fatal
//! errors to process exit codes (2 input/environment, 3 missing OCR
//! capability, 4 empty document, 1 otherwise).

use clap::Parser;
use pdfocr::{ExtractError, ExtractionConfig, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "pdfocr",
    version,
    about = "Extract text from PDFs with a local OCR engine",
    long_about = "Rasterise each PDF page, recognise it with a local OCR engine, and \
                  assemble plain-text and Markdown outputs. No network access required."
)]
struct Cli {
    /// Input PDF file
    #[arg(short, long, env = "PDFOCR_INPUT")]
    input: PathBuf,

    /// Output directory for written artifacts
    #[arg(short, long, env = "PDFOCR_OUTDIR", default_value = "./out")]
    outdir: PathBuf,

    /// Rendering resolution in DPI
    #[arg(long, env = "PDFOCR_DPI", default_value_t = 300)]
    dpi: u32,

    /// OCR language tag (BCP-47, e.g. en, ko-KR, zh-CN)
    #[arg(long, env = "PDFOCR_LANG", default_value = "en")]
    lang: String,

    /// Output format: text, md, or both
    #[arg(long, env = "PDFOCR_FMT", default_value = "both", value_parser = parse_format)]
    fmt: OutputFormat,

    /// Process at most this many pages, from page 1
    #[arg(long)]
    max_pages: Option<usize>,

    /// Run the full pipeline without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Also write per-page rendered PNGs and the layout JSON
    #[arg(long)]
    dump_pages: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pdfocr={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<ExtractError>()
                .map(ExtractError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut builder = ExtractionConfig::builder()
        .dpi(cli.dpi)
        .language(&cli.lang)
        .format(cli.fmt)
        .outdir(&cli.outdir)
        .dry_run(cli.dry_run)
        .dump_pages(cli.dump_pages);
    if let Some(n) = cli.max_pages {
        builder = builder.max_pages(n);
    }
    let config = builder.build()?;

    let (output, write_result) = pdfocr::extract_to_dir(&cli.input, &config).await?;

    for failure in output.failures() {
        if let Some(e) = &failure.error {
            eprintln!("Warning: {e}");
        }
    }

    let stats = &output.stats;
    eprintln!(
        "Processed {}/{} page(s) ({} failed) in {} ms",
        stats.processed_pages, stats.selected_pages, stats.failed_pages, stats.total_duration_ms
    );
    if cli.dry_run {
        eprintln!("Dry-run: no files written");
        return Ok(());
    }
    // Extraction succeeded even if the write stage did not; report the
    // stats above before surfacing a write failure.
    let written = write_result?;
    for path in &written {
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}
