//! Entry points: classify one input and route it to the right stage.
//!
//! ## Classification order
//!
//! ```text
//! http(s) URL ─────────────────────▶ download, then encode
//! *.png|jpg|jpeg|gif|webp|bmp|svg ─▶ encode to sidecars
//! *.mime.b64 | *.raw.b64 ──────────▶ decode sidecar
//! *.b64 passing the content probe ─▶ decode sidecar
//! anything else / stdin ───────────▶ JSON walker, or text pass if not JSON
//! ```
//!
//! The order is fixed, so `photo.png.b64` is a sidecar (its final extension
//! is `.b64`) and a `.b64` file that does not decode to an image falls
//! through to the document passes like any other text file.

use crate::config::ProcessConfig;
use crate::error::B64Error;
use crate::output::{DocumentFormat, DocumentOutput, Outcome};
use crate::pipeline::save::PayloadSaver;
use crate::pipeline::transcode::{self, SidecarKind};
use crate::pipeline::{input, json, naming, text};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

/// What kind of input a run received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKind {
    /// An `http`/`https` URL pointing at an image.
    Url(String),
    /// A local file with an image extension.
    ImageFile(PathBuf),
    /// A base64 sidecar file.
    Sidecar { path: PathBuf, kind: SidecarKind },
    /// Any other local file, read as JSON or text.
    Document(PathBuf),
    /// No argument: read JSON or text from standard input.
    Stdin,
}

/// Classify an input argument. `None` means standard input.
///
/// Generic `.b64` files are opened and probed; nothing else touches the
/// filesystem.
pub fn classify(arg: Option<&str>) -> InputKind {
    let Some(arg) = arg else {
        return InputKind::Stdin;
    };

    if input::is_url(arg) {
        return InputKind::Url(arg.to_string());
    }

    let path = PathBuf::from(arg);
    if naming::is_image_path(&path) {
        return InputKind::ImageFile(path);
    }

    match SidecarKind::from_path(&path) {
        Some(kind @ (SidecarKind::Mime | SidecarKind::Raw)) => InputKind::Sidecar { path, kind },
        Some(SidecarKind::Generic) if transcode::probe_generic_b64(&path) => InputKind::Sidecar {
            path,
            kind: SidecarKind::Generic,
        },
        _ => InputKind::Document(path),
    }
}

/// Process one input (path, URL, or `None` for stdin).
///
/// # Errors
/// Fatal errors only: unreadable input, failed download, non-image download,
/// malformed sidecar, or a broken `mime_type`/`data` pair in JSON. Embedded
/// data-URLs that fail are reported in [`DocumentOutput::skipped`].
pub async fn process(arg: Option<&str>, config: &ProcessConfig) -> Result<Outcome, B64Error> {
    let kind = classify(arg);
    debug!("Classified input {:?} as {:?}", arg, kind);
    let output_dir = config.output_dir();

    match kind {
        InputKind::Url(url) => {
            let bytes = input::download_url(&url, config.download_timeout_secs).await?;
            let image = input::persist_download(&url, &bytes, output_dir)?;
            let sidecars = transcode::encode_image_file(&image, output_dir)?;
            Ok(Outcome::Downloaded { image, sidecars })
        }
        InputKind::ImageFile(path) => {
            transcode::encode_image_file(&path, output_dir).map(Outcome::Encoded)
        }
        InputKind::Sidecar { path, .. } => {
            let path = transcode::decode_sidecar_file(&path, output_dir, config.overwrite.as_ref())?;
            Ok(Outcome::Decoded { path })
        }
        InputKind::Document(path) => {
            let bytes = read_document(&path).await?;
            process_bytes(&bytes, config).map(Outcome::Document)
        }
        InputKind::Stdin => {
            let mut bytes = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut bytes)
                .await
                .map_err(|e| B64Error::from_read("<stdin>", e))?;
            process_bytes(&bytes, config).map(Outcome::Document)
        }
    }
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(arg: Option<&str>, config: &ProcessConfig) -> Result<Outcome, B64Error> {
    tokio::runtime::Runtime::new()
        .map_err(|e| B64Error::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(process(arg, config))
}

/// Rewrite an in-memory JSON or text document.
///
/// Content that parses as JSON goes through the JSON walker and is
/// re-serialised (compact, or indented when `config.pretty_json`); anything
/// else goes through the text pass.
pub fn process_bytes(bytes: &[u8], config: &ProcessConfig) -> Result<DocumentOutput, B64Error> {
    let saver = PayloadSaver::new(config.output_dir(), &config.names);

    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(mut value) => {
            let report = json::rewrite_json(&mut value, &saver)?;
            let mut content = if config.pretty_json {
                serde_json::to_string_pretty(&value)?
            } else {
                serde_json::to_string(&value)?
            };
            content.push('\n');
            info!(
                "Rewrote JSON document: {} image(s) saved, {} skipped",
                report.saved.len(),
                report.skipped.len()
            );
            Ok(DocumentOutput {
                format: DocumentFormat::Json,
                content: content.into_bytes(),
                saved: report.saved.into_iter().map(|s| s.path).collect(),
                skipped: report.skipped,
            })
        }
        Err(e) => {
            debug!("Not JSON ({}), treating as text", e);
            if config.pretty_json {
                warn!("--pretty only applies to JSON input, ignoring");
            }
            let rewrite = text::rewrite_text(bytes, &saver);
            info!(
                "Rewrote text document: {} image(s) saved, {} skipped",
                rewrite.saved.len(),
                rewrite.skipped.len()
            );
            Ok(DocumentOutput {
                format: DocumentFormat::Text,
                content: rewrite.text,
                saved: rewrite.saved.into_iter().map(|s| s.path).collect(),
                skipped: rewrite.skipped,
            })
        }
    }
}

async fn read_document(path: &Path) -> Result<Vec<u8>, B64Error> {
    tokio::fs::read(path)
        .await
        .map_err(|e| B64Error::from_read(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::codec;
    use tempfile::TempDir;

    #[test]
    fn classify_stdin_and_url() {
        assert_eq!(classify(None), InputKind::Stdin);
        assert_eq!(
            classify(Some("https://x.io/a.png")),
            InputKind::Url("https://x.io/a.png".into())
        );
    }

    #[test]
    fn classify_by_extension_before_probe() {
        assert_eq!(
            classify(Some("shots/A.PNG")),
            InputKind::ImageFile("shots/A.PNG".into())
        );
        assert_eq!(
            classify(Some("missing.mime.b64")),
            InputKind::Sidecar {
                path: "missing.mime.b64".into(),
                kind: SidecarKind::Mime
            }
        );
        assert_eq!(
            classify(Some("notes.md")),
            InputKind::Document("notes.md".into())
        );
    }

    #[test]
    fn classify_generic_b64_by_probe() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("photo.png.b64");
        let junk = tmp.path().join("notes.b64");
        std::fs::write(&image, codec::encode(b"GIF89a\x01\x00\x01\x00")).unwrap();
        std::fs::write(&junk, codec::encode(b"just some words")).unwrap();

        let image_arg = image.to_string_lossy().into_owned();
        let junk_arg = junk.to_string_lossy().into_owned();
        assert!(matches!(
            classify(Some(&image_arg)),
            InputKind::Sidecar { kind: SidecarKind::Generic, .. }
        ));
        assert_eq!(classify(Some(&junk_arg)), InputKind::Document(junk));
    }

    #[test]
    fn process_bytes_json_compact_and_pretty() {
        let tmp = TempDir::new().unwrap();
        let compact = ProcessConfig::builder().output_dir(tmp.path()).build().unwrap();
        let out = process_bytes(br#"{"b": [1, 2], "a": "x"}"#, &compact).unwrap();
        assert_eq!(out.format, DocumentFormat::Json);
        assert_eq!(out.text(), "{\"b\":[1,2],\"a\":\"x\"}\n");

        let pretty = ProcessConfig::builder()
            .output_dir(tmp.path())
            .pretty_json(true)
            .build()
            .unwrap();
        let out = process_bytes(br#"{"a":1}"#, &pretty).unwrap();
        assert_eq!(out.text(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn process_bytes_text_is_verbatim_without_payloads() {
        let tmp = TempDir::new().unwrap();
        let config = ProcessConfig::builder()
            .output_dir(tmp.path())
            .pretty_json(true)
            .build()
            .unwrap();
        let out = process_bytes(b"# heading\nno images here", &config).unwrap();
        assert_eq!(out.format, DocumentFormat::Text);
        assert_eq!(out.content, b"# heading\nno images here");
        assert!(out.saved.is_empty());
    }

    #[test]
    fn process_bytes_latin1_text_is_not_reencoded() {
        let tmp = TempDir::new().unwrap();
        let config = ProcessConfig::builder().output_dir(tmp.path()).build().unwrap();
        let mut input = b"r\xe9sum\xe9: ".to_vec();
        input.extend_from_slice(format!("data:image/gif;base64,{}", codec::encode(b"GIF89a")).as_bytes());

        let out = process_bytes(&input, &config).unwrap();
        assert_eq!(out.format, DocumentFormat::Text);
        assert_eq!(out.saved.len(), 1);
        assert!(out.content.starts_with(b"r\xe9sum\xe9: "));
        assert!(!out.text().contains("base64"));
    }

    #[test]
    fn process_sync_encodes_image_file() {
        let tmp = TempDir::new().unwrap();
        let img = tmp.path().join("dot.gif");
        std::fs::write(&img, b"GIF89a\x01\x00\x01\x00").unwrap();

        let config = ProcessConfig::default();
        let arg = img.to_string_lossy().into_owned();
        match process_sync(Some(&arg), &config).unwrap() {
            Outcome::Encoded(s) => {
                assert_eq!(s.raw_path, tmp.path().join("dot.raw.b64"));
                assert_eq!(s.mime_path, tmp.path().join("dot.mime.b64"));
            }
            other => panic!("expected Encoded, got {other:?}"),
        }
    }
}
