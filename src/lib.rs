//! # b64-image
//!
//! Move images between binary files and base64 text, in both directions.
//!
//! ## What it handles
//!
//! | Input | Result |
//! |-------|--------|
//! | JSON with `{"mime_type": "image/…", "data": "<base64>"}` | `data` replaced by `decoded/<name>.<ext>` |
//! | JSON strings holding `data:image/…;base64,…` or `![alt](data:…)` | string replaced by the file reference |
//! | Markdown / text with `![alt](data:image/…;base64,…)` | `![alt](decoded/<name>.<ext>)` |
//! | Text with bare `data:image/…;base64,…` | `decoded/<name>.<ext>` |
//! | `photo.png` (or jpg, jpeg, gif, webp, bmp, svg) | `photo.raw.b64` + `photo.mime.b64` |
//! | `photo.raw.b64` / `photo.mime.b64` / `photo.b64` | `photo.<sniffed ext>` |
//! | `https://…/photo.jpg` | downloaded image + both sidecars |
//!
//! Formats are detected from magic bytes only (PNG, JPEG, GIF, WEBP, BMP,
//! SVG); filenames and claimed MIME types are never trusted for decoded
//! content. Encoding then decoding a file reproduces it byte for byte.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use b64_image::{process, Outcome, ProcessConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessConfig::builder().pretty_json(true).build()?;
//!     if let Outcome::Document(doc) = process(Some("response.json"), &config).await? {
//!         print!("{}", doc.text());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error policy
//!
//! Standalone work (encoding or decoding one file, downloading one URL) is
//! all-or-nothing and returns [`B64Error`]. Embedded data-URLs in a document
//! are best effort: one bad payload is left as is, logged with
//! `tracing::warn!`, and recorded in [`DocumentOutput::skipped`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `b64` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod confirm;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ProcessConfig, ProcessConfigBuilder};
pub use confirm::{AlwaysOverwrite, NeverOverwrite, OverwriteConfirm, OverwriteHook};
pub use dispatch::{classify, process, process_bytes, process_sync, InputKind};
pub use error::{B64Error, PayloadSite, SkippedPayload};
pub use output::{DocumentFormat, DocumentOutput, Outcome};
pub use pipeline::naming::NameSequence;
pub use pipeline::sniff::{detect, ImageFormat};
pub use pipeline::transcode::{decode_sidecar_file, encode_image_file, EncodedSidecars, SidecarKind};
