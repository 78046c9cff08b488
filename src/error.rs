//! Error types for the b64-image library.
//!
//! Two distinct types reflect two distinct failure modes:
//!
//! * [`B64Error`] (**fatal**): the unit of work cannot proceed at all (bad
//!   sidecar file, unreadable input, failed download, undecodable payload in
//!   a JSON `mime_type`/`data` pair). Returned as `Err(B64Error)` from the
//!   top-level entry points.
//!
//! * [`SkippedPayload`] (**non-fatal**): one embedded data-URL in a text or
//!   JSON string could not be saved. The occurrence is left untouched in the
//!   output and the rest of the document is still processed. Stored in
//!   [`crate::output::DocumentOutput`] so callers can report partial success.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the b64-image library.
#[derive(Debug, Error)]
pub enum B64Error {
    // ── Content errors ────────────────────────────────────────────────────
    /// Payload is not valid standard-alphabet base64.
    #[error("failed to decode base64: {0}")]
    MalformedBase64(#[from] base64::DecodeError),

    /// Content had to be an image but matches no known signature.
    #[error("{what} is not a valid image (no PNG/JPEG/GIF/WEBP/BMP/SVG signature found)")]
    UnrecognizedContent { what: String },

    /// A sidecar file's framing does not parse.
    #[error("invalid {kind} format in '{path}': expected 'mime_type;base64,data'")]
    InvalidSidecar { path: PathBuf, kind: &'static str },

    // ── Filesystem errors ─────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading an input failed for another reason.
    #[error("failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create an output directory.
    #[error("failed to create output directory '{path}': {source}")]
    CreateDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an output file.
    #[error("failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Network errors ────────────────────────────────────────────────────
    /// HTTP URL was syntactically valid but the download failed.
    #[error("failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The rewritten JSON document could not be serialised.
    #[error("failed to serialise JSON output: {0}")]
    JsonOutput(#[from] serde_json::Error),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl B64Error {
    /// Map an I/O error on `path` to the closest read-side variant.
    pub(crate) fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => B64Error::FileNotFound { path },
            std::io::ErrorKind::PermissionDenied => B64Error::PermissionDenied { path },
            _ => B64Error::ReadFailed { path, source },
        }
    }
}

/// Where an embedded payload was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSite {
    /// `![alt](data:image/…;base64,…)` in text.
    MarkdownImage,
    /// Bare `data:image/…;base64,…` in text.
    DataUrl,
    /// A JSON string value holding either of the above.
    JsonString,
}

/// A non-fatal failure for a single embedded payload.
///
/// The matched text is left unchanged in the output.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("skipped {site:?} payload ({mime}): {reason}")]
pub struct SkippedPayload {
    pub site: PayloadSite,
    pub mime: String,
    pub reason: String,
}
