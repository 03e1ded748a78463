//! CLI binary for pdf2text.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2text::{
    extract, extract_to_file, inspect, ExtractionConfig, ExtractionOutput,
    ExtractionProgressCallback, Pdf2TextError, ProgressCallback, Provenance,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: a spinner while the text-layer tiers run, switching to
/// a page bar once OCR starts. Pages may finish out of order when
/// `--concurrency` is above 1.
struct CliProgressCallback {
    bar: ProgressBar,
    page_errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("OCR");
    }

    fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_tier_start(&self, tier: Provenance) {
        self.bar.set_prefix("Extracting");
        self.bar.set_message(format!("{tier} text layer…"));
    }

    fn on_tier_complete(&self, tier: Provenance, chars: usize, usable: bool) {
        let verdict = if usable {
            green("usable")
        } else {
            cyan("looks scanned")
        };
        self.bar.println(format!(
            "  {} {:<10}  {}  {}",
            if usable { green("✓") } else { cyan("·") },
            tier.as_str(),
            dim(&format!("{chars:>6} chars")),
            verdict
        ));
    }

    fn on_tier_failed(&self, tier: Provenance, error: &str) {
        self.bar.println(format!(
            "  {} {:<10}  {}",
            red("✗"),
            tier.as_str(),
            red(&shorten(error))
        ));
    }

    fn on_ocr_start(&self, pages: usize) {
        self.activate_bar(pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Running OCR on {pages} pages…"))
        ));
    }

    fn on_page_complete(&self, page_num: usize, chars: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            green("✓"),
            page_num,
            dim(&format!("{chars:>5} chars")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}  {}",
            red("✗"),
            page_num,
            red(&shorten(error)),
        ));
        self.bar.inc(1);
    }

    fn on_extraction_complete(&self, tier: Provenance, chars: usize) {
        self.bar.finish_and_clear();
        let failed = self.page_errors.load(Ordering::SeqCst);
        if failed == 0 {
            eprintln!(
                "{} {} chars extracted via {} tier",
                green("✔"),
                bold(&chars.to_string()),
                tier
            );
        } else {
            eprintln!(
                "{} {} chars extracted via {} tier  ({} pages failed)",
                cyan("⚠"),
                bold(&chars.to_string()),
                tier,
                red(&failed.to_string()),
            );
        }
    }
}

/// Keep very long error messages to one terminal line.
fn shorten(error: &str) -> String {
    let first_line = error.lines().next().unwrap_or_default();
    if first_line.chars().count() > 80 {
        let cut: String = first_line.chars().take(79).collect();
        format!("{cut}\u{2026}")
    } else {
        first_line.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract to stdout
  pdf2text document.pdf

  # Extract to a file
  pdf2text document.pdf -o document.txt

  # Smaller deployment: OCR at most 3 pages, cap output at 6000 chars
  pdf2text --pages-to-ocr 3 --char-limit 6000 scan.pdf

  # Extract from a URL
  pdf2text https://arxiv.org/pdf/1706.03762 -o attention.txt

  # Inspect PDF metadata
  pdf2text --inspect-only document.pdf

  # JSON output with provenance, per-page OCR results and stats
  pdf2text --json scan.pdf > output.json

TIERS:
  native      lopdf text objects            fast, no native deps
  structured  pdfium text layer             needs libpdfium
  ocr         150 DPI render + Otsu + OCR   needs libpdfium and tesseract

  A tier's text is used when it has at least --scan-threshold characters;
  otherwise the next tier runs.

EXIT CODES:
  0  success
  1  usage, input or output error
  3  unreadable document (corrupt or not a PDF)
  4  text too weak (scan too poor to read)
  5  extraction engine unavailable (pdfium or tesseract missing)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH   Path to libpdfium, tried before ./ and the system path
  RUST_LOG          Override the log filter (e.g. pdf2text=debug)
"#;

/// Extract plain text from PDF files and URLs, with OCR for scans.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Extract plain text from PDF files and URLs, with OCR for scans",
    long_about = "Extract plain text from PDF documents (local files or URLs). Tries the \
embedded text layer first and falls back to OCR (tesseract) on the first pages when the \
document looks scanned.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path or HTTP/HTTPS URL.
    input: String,

    /// Write text to this file instead of stdout.
    #[arg(short, long, env = "PDF2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Maximum number of pages to OCR.
    #[arg(long, env = "PDF2TEXT_PAGES_TO_OCR", default_value_t = 5)]
    pages_to_ocr: usize,

    /// Maximum characters of text returned.
    #[arg(long, env = "PDF2TEXT_CHAR_LIMIT", default_value_t = 20_000)]
    char_limit: usize,

    /// Characters a tier must produce to count as usable.
    #[arg(long, env = "PDF2TEXT_SCAN_THRESHOLD", default_value_t = pdf2text::SCANNED_TEXT_THRESHOLD)]
    scan_threshold: usize,

    /// Minimum characters in the final text before reporting it as too weak.
    #[arg(long, env = "PDF2TEXT_MIN_CHARS", default_value_t = 100)]
    min_chars: usize,

    /// OCR rendering DPI (72–400).
    #[arg(long, env = "PDF2TEXT_DPI", default_value_t = pdf2text::OCR_DPI,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Tesseract language code.
    #[arg(long, env = "PDF2TEXT_LANG", default_value = "eng")]
    lang: String,

    /// Number of pages OCR'd concurrently.
    #[arg(short, long, env = "PDF2TEXT_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Tesseract executable name or path.
    #[arg(long, env = "PDF2TEXT_TESSERACT", default_value = "tesseract")]
    tesseract: PathBuf,

    /// Output structured JSON (ExtractionOutput) instead of plain text.
    /// With `-o`, the text still goes to the file and the JSON to stdout.
    #[arg(long, env = "PDF2TEXT_JSON")]
    json: bool,

    /// Disable progress output.
    #[arg(long, env = "PDF2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TEXT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2TEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress output is active;
    // it already reports every tier and page.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };

    let outcome = run(&cli, progress.clone()).await;
    if let Some(ref cb) = progress {
        cb.clear();
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: &Cli, progress: Option<Arc<CliProgressCallback>>) -> Result<()> {
    let progress_shown = progress.is_some();
    let config = build_config(cli, progress.map(|cb| cb as ProgressCallback))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input, &config)
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input);
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Run extraction ───────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let output = extract_to_file(&cli.input, output_path, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else if !cli.quiet {
            // With progress on, the callback already printed the chars line.
            eprintln!("{}", saved_line(&output, output_path, !progress_shown));
        }
    } else {
        let output = extract(&cli.input, &config)
            .await
            .context("Extraction failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.text.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json && cli.no_progress {
            print_summary(&output);
        }
    }

    Ok(())
}

/// Where the text went, optionally with the chars/tier summary.
fn saved_line(output: &ExtractionOutput, path: &Path, with_summary: bool) -> String {
    let target = bold(&path.display().to_string());
    if with_summary {
        format!(
            "{}  {} chars via {}  {}ms  →  {}",
            green("✔"),
            output.char_count,
            output.provenance,
            output.stats.total_duration_ms,
            target,
        )
    } else {
        format!("  {}  {}", dim("→"), target)
    }
}

/// One-line summary when the progress output is off.
fn print_summary(output: &ExtractionOutput) {
    eprintln!(
        "Extracted {} chars from '{}' via {} tier in {}ms{}",
        output.char_count,
        output.document_name,
        output.provenance,
        output.stats.total_duration_ms,
        if output.truncated { " (truncated)" } else { "" }
    );
    if output.stats.ocr_failed_pages > 0 {
        eprintln!(
            "  {} of {} OCR pages failed",
            output.stats.ocr_failed_pages, output.stats.ocr_pages
        );
    }
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .pages_to_ocr(cli.pages_to_ocr)
        .char_limit(cli.char_limit)
        .scan_threshold(cli.scan_threshold)
        .min_text_chars(cli.min_chars)
        .dpi(cli.dpi)
        .ocr_language(cli.lang.clone())
        .ocr_concurrency(cli.concurrency)
        .tesseract_path(cli.tesseract.clone())
        .download_timeout_secs(cli.download_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Distinct exit codes so scripts can tell a corrupt file from a poor scan.
fn exit_code(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<Pdf2TextError>().map(Pdf2TextError::kind) {
        Some("unreadable-document") => 3,
        Some("text-too-weak") => 4,
        Some("engine-unavailable") => 5,
        _ => 1,
    }
}
