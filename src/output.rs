//! Result types returned by the dispatcher.

use crate::error::SkippedPayload;
use crate::pipeline::transcode::EncodedSidecars;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;

/// What a single run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// An image file was encoded into two sidecars.
    Encoded(EncodedSidecars),
    /// A sidecar was decoded into this image file.
    Decoded { path: PathBuf },
    /// A URL was downloaded to `image` and then encoded.
    Downloaded {
        image: PathBuf,
        sidecars: EncodedSidecars,
    },
    /// A JSON or text document was rewritten.
    Document(DocumentOutput),
}

/// Shape of a rewritten document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Json,
    Text,
}

/// A rewritten JSON or text document, ready for stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentOutput {
    pub format: DocumentFormat,
    /// Rendered content. JSON ends with a newline; text keeps the input's
    /// bytes outside replaced payloads, whatever their encoding.
    pub content: Vec<u8>,
    /// Files written for embedded payloads.
    pub saved: Vec<PathBuf>,
    /// Embedded payloads left unchanged.
    pub skipped: Vec<SkippedPayload>,
}

impl DocumentOutput {
    /// `true` when every embedded payload was extracted.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Content as text, with invalid UTF-8 shown as U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
