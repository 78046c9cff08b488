//! Markdown / plain-text pass: replace embedded data-URLs with file references.
//!
//! The pass works on raw bytes, so text in any encoding (Latin-1, broken
//! UTF-8, binary noise between payloads) is copied through untouched. Only
//! the MIME type and payload of a match are read as text.
//!
//! ## Why two phases?
//!
//! A Markdown image `![alt](data:image/png;base64,…)` also contains a bare
//! data-URL. Replacing in place with two successive `replace_all` calls would
//! let the second pattern bite into Markdown matches the first one had to
//! leave alone (e.g. because their payload failed to decode). Instead every
//! match span is collected first, bare matches overlapping a Markdown span are
//! dropped, and the output is assembled once.
//!
//! Failures are non-fatal: the matched text is copied through unchanged and a
//! [`SkippedPayload`] is recorded.

use crate::error::{PayloadSite, SkippedPayload};
use crate::pipeline::save::{PayloadSaver, SavedPayload};
use once_cell::sync::Lazy;
use regex::{bytes, Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;
use tracing::{debug, warn};

/// `![alt](data:<mime>;base64,<payload>)`
const MARKDOWN_IMAGE: &str = r"!\[([^\]]*)\]\(data:(image/[^;]+);base64,([^)]+)\)";

/// `data:<mime>;base64,<payload>` anywhere in text.
const DATA_URL: &str = r"data:(image/[^;]+);base64,([A-Za-z0-9+/=]+)";

static RE_MARKDOWN_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(MARKDOWN_IMAGE).unwrap());

// (?-u): classes match single bytes, so non-UTF-8 input is scanned as is.
static RE_MARKDOWN_IMAGE_BYTES: Lazy<bytes::Regex> =
    Lazy::new(|| bytes::Regex::new(&format!("(?-u){MARKDOWN_IMAGE}")).unwrap());

static RE_DATA_URL_BYTES: Lazy<bytes::Regex> =
    Lazy::new(|| bytes::Regex::new(&format!("(?-u){DATA_URL}")).unwrap());

/// A string that is nothing but a data-URL.
static RE_DATA_URL_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[^;]+);base64,(.+)$").unwrap());

/// Result of rewriting a text document.
#[derive(Debug, Default)]
pub struct TextRewrite {
    pub text: Vec<u8>,
    pub saved: Vec<SavedPayload>,
    pub skipped: Vec<SkippedPayload>,
}

/// One embedded payload found during the scan phase.
struct Occurrence<'t> {
    range: Range<usize>,
    /// `Some(alt)` for Markdown images, `None` for bare data-URLs.
    alt: Option<&'t [u8]>,
    mime: Cow<'t, str>,
    /// Invalid UTF-8 here becomes U+FFFD and fails to decode, which leaves
    /// the original bytes in place.
    payload: Cow<'t, str>,
}

impl Occurrence<'_> {
    fn site(&self) -> PayloadSite {
        if self.alt.is_some() {
            PayloadSite::MarkdownImage
        } else {
            PayloadSite::DataUrl
        }
    }

    fn render(&self, reference: &str, out: &mut Vec<u8>) {
        match self.alt {
            Some(alt) => {
                out.extend_from_slice(b"![");
                out.extend_from_slice(alt);
                out.extend_from_slice(b"](");
                out.extend_from_slice(reference.as_bytes());
                out.push(b')');
            }
            None => out.extend_from_slice(reference.as_bytes()),
        }
    }
}

/// Replace every embedded image payload in `text` with a file reference.
///
/// Bytes outside the replaced matches are copied verbatim.
pub fn rewrite_text(text: &[u8], saver: &PayloadSaver<'_>) -> TextRewrite {
    let occurrences = scan(text);
    debug!("Found {} embedded payload(s) in text", occurrences.len());

    let mut result = TextRewrite {
        text: Vec::with_capacity(text.len()),
        ..TextRewrite::default()
    };

    let mut cursor = 0;
    for occ in &occurrences {
        result.text.extend_from_slice(&text[cursor..occ.range.start]);
        match saver.save(&occ.payload, &occ.mime) {
            Ok(saved) => {
                occ.render(&saved.reference, &mut result.text);
                result.saved.push(saved);
            }
            Err(e) => {
                warn!("Failed to save {:?} image ({}): {}", occ.site(), occ.mime, e);
                result.skipped.push(SkippedPayload {
                    site: occ.site(),
                    mime: occ.mime.to_string(),
                    reason: e.to_string(),
                });
                result.text.extend_from_slice(&text[occ.range.clone()]);
            }
        }
        cursor = occ.range.end;
    }
    result.text.extend_from_slice(&text[cursor..]);
    result
}

/// Collect Markdown matches, then bare matches outside them, in text order.
fn scan(text: &[u8]) -> Vec<Occurrence<'_>> {
    let mut found: Vec<Occurrence<'_>> = RE_MARKDOWN_IMAGE_BYTES
        .captures_iter(text)
        .filter_map(|caps| {
            Some(Occurrence {
                range: caps.get(0)?.range(),
                alt: Some(caps.get(1)?.as_bytes()),
                mime: String::from_utf8_lossy(caps.get(2)?.as_bytes()),
                payload: String::from_utf8_lossy(caps.get(3)?.as_bytes()),
            })
        })
        .collect();

    let markdown_spans: Vec<Range<usize>> = found.iter().map(|o| o.range.clone()).collect();

    found.extend(RE_DATA_URL_BYTES.captures_iter(text).filter_map(|caps| {
        let range = caps.get(0)?.range();
        if markdown_spans
            .iter()
            .any(|s| range.start < s.end && s.start < range.end)
        {
            return None;
        }
        Some(Occurrence {
            range,
            alt: None,
            mime: String::from_utf8_lossy(caps.get(1)?.as_bytes()),
            payload: String::from_utf8_lossy(caps.get(2)?.as_bytes()),
        })
    }));

    found.sort_by_key(|o| o.range.start);
    found
}

/// Outcome of testing a single JSON string value.
#[derive(Debug)]
pub(crate) enum StringRewrite {
    /// Not an embedded image; leave as is.
    Untouched,
    /// Replace the whole string with `value`.
    Replaced { value: String, saved: SavedPayload },
    /// Looked like an embedded image but could not be saved.
    Skipped(SkippedPayload),
}

/// Rewrite a JSON string value holding a Markdown image or a bare data-URL.
///
/// A Markdown image anywhere in the string turns the whole string into
/// `![alt](<reference>)`. Otherwise the string must be exactly a data-URL to
/// be replaced by the bare reference. The Markdown test runs first because a
/// Markdown-wrapped data-URL also satisfies the bare pattern.
pub(crate) fn rewrite_string_value(value: &str, saver: &PayloadSaver<'_>) -> StringRewrite {
    if let Some(caps) = RE_MARKDOWN_IMAGE.captures(value) {
        let (alt, mime, payload) = (group(&caps, 1), group(&caps, 2), group(&caps, 3));
        return match saver.save(payload, mime) {
            Ok(saved) => StringRewrite::Replaced {
                value: markdown_image(alt, &saved.reference),
                saved,
            },
            Err(e) => skipped_string(mime, e),
        };
    }

    if let Some(caps) = RE_DATA_URL_EXACT.captures(value) {
        let (mime, payload) = (group(&caps, 1), group(&caps, 2));
        return match saver.save(payload, mime) {
            Ok(saved) => StringRewrite::Replaced {
                value: saved.reference.clone(),
                saved,
            },
            Err(e) => skipped_string(mime, e),
        };
    }

    StringRewrite::Untouched
}

fn skipped_string(mime: &str, e: crate::error::B64Error) -> StringRewrite {
    warn!("Failed to save data URL image in JSON string ({}): {}", mime, e);
    StringRewrite::Skipped(SkippedPayload {
        site: PayloadSite::JsonString,
        mime: mime.to_string(),
        reason: e.to_string(),
    })
}

fn group<'t>(caps: &Captures<'t>, i: usize) -> &'t str {
    caps.get(i).map_or("", |m| m.as_str())
}

fn markdown_image(alt: &str, reference: &str) -> String {
    format!("![{alt}]({reference})")
}
