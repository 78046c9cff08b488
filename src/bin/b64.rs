//! CLI binary for b64-image.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessConfig`, prompts before overwriting, and prints results.

use anyhow::{Context, Result};
use b64_image::confirm::is_affirmative;
use b64_image::{process, Outcome, OverwriteConfirm, ProcessConfig};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"SUPPORTED INPUTS:
  - JSON files with base64 images (parsed, rewritten, re-serialised)
  - Plain text with data URLs (e.g. data:image/png;base64,...)
  - Markdown with embedded images (e.g. ![alt](data:image/...))
  - Image files (PNG, JPEG, GIF, WebP, BMP, SVG) → .raw.b64 + .mime.b64
  - .b64 / .raw.b64 / .mime.b64 files → image file
  - HTTP/HTTPS URLs pointing to image files

EXAMPLES:
  b64 s.json | jq                 # Process JSON file, compact output
  b64 --pretty s.json             # Process JSON file, indented output
  b64 image.png                   # Encode image to base64 (same directory)
  b64 -o /tmp image.png           # Encode image to base64 (given directory)
  b64 image.mime.b64              # Decode back to image.png
  b64 document.md                 # Process markdown/text file
  b64 http://example.com/pic.jpg  # Download and encode image from URL
  cat s.json | b64 -p | jq        # Process from stdin

Extracted images go to ./decoded unless --output is given.
"#;

/// Extract base64 images from JSON/Markdown/text, or encode/decode image files.
#[derive(Parser, Debug)]
#[command(
    name = "b64",
    version,
    about = "Extract base64 images from text or JSON, or encode image files to base64",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file or HTTP/HTTPS URL (reads stdin if omitted).
    input: Option<String>,

    /// Pretty print JSON output (JSON input only).
    #[arg(short, long, visible_alias = "format-json", short_alias = 'f', env = "B64_PRETTY")]
    pretty: bool,

    /// Output directory for extracted, encoded or decoded files.
    #[arg(short, long, env = "B64_OUTPUT")]
    output: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "B64_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "B64_VERBOSE")]
    verbose: bool,

    /// Suppress everything on stderr except errors.
    #[arg(short, long, env = "B64_QUIET")]
    quiet: bool,
}

/// Ask on stderr, read the answer from stdin.
struct StdinConfirm;

impl OverwriteConfirm for StdinConfirm {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        eprint!("File '{}' already exists. Overwrite? (y/N): ", path.display());
        io::stderr().flush().ok();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_affirmative(&answer),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Warnings for skipped payloads are shown by default; stdout stays
    // reserved for the rewritten document.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli)?;

    let outcome = process(cli.input.as_deref(), &config)
        .await
        .with_context(|| match cli.input.as_deref() {
            Some(input) => format!("Failed to process '{input}'"),
            None => "Failed to process standard input".to_string(),
        })?;

    print_outcome(&outcome, cli.quiet)
}

/// Map CLI args to `ProcessConfig`.
fn build_config(cli: &Cli) -> Result<ProcessConfig> {
    let mut builder = ProcessConfig::builder()
        .pretty_json(cli.pretty)
        .download_timeout_secs(cli.download_timeout)
        .overwrite_confirm(Arc::new(StdinConfirm));

    if let Some(ref dir) = cli.output {
        builder = builder.output_dir(dir);
    }

    builder.build().context("Invalid configuration")
}

fn print_outcome(outcome: &Outcome, quiet: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match outcome {
        Outcome::Encoded(sidecars) => {
            writeln!(out, "Generated:")?;
            writeln!(out, "  {}", sidecars.raw_path.display())?;
            writeln!(out, "  {}", sidecars.mime_path.display())?;
        }
        Outcome::Downloaded { image, sidecars } => {
            if !quiet {
                eprintln!("Saved original image: {}", image.display());
            }
            writeln!(out, "Generated:")?;
            writeln!(out, "  {}", sidecars.raw_path.display())?;
            writeln!(out, "  {}", sidecars.mime_path.display())?;
        }
        Outcome::Decoded { path } => {
            writeln!(out, "Decoded image saved to: {}", path.display())?;
        }
        Outcome::Document(doc) => {
            out.write_all(&doc.content)
                .context("Failed to write to stdout")?;
            if !quiet && !doc.is_complete() {
                eprintln!(
                    "{} embedded image(s) could not be extracted and were left unchanged",
                    doc.skipped.len()
                );
            }
        }
    }

    out.flush().context("Failed to flush stdout")
}
