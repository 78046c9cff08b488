//! Filename policy: extensions, MIME types, and collision-resistant names.
//!
//! Extensions always carry their leading dot (`.png`), matching what gets
//! appended to a base name.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Extensions (lower-case, without dot) that mark a path as an image file.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// Derive a file extension from a MIME string by substring match.
///
/// Checked in order: `jpeg`/`jpg`, `png`, `gif`, `webp`, `bmp`, `svg`.
/// Anything else maps to `.png`.
pub fn extension_from_mime(mime: &str) -> &'static str {
    if mime.contains("jpeg") || mime.contains("jpg") {
        ".jpg"
    } else if mime.contains("png") {
        ".png"
    } else if mime.contains("gif") {
        ".gif"
    } else if mime.contains("webp") {
        ".webp"
    } else if mime.contains("bmp") {
        ".bmp"
    } else if mime.contains("svg") {
        ".svg"
    } else {
        ".png"
    }
}

/// MIME type for a file extension, with or without the leading dot.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "image/png",
    }
}

/// MIME type implied by the final extension of `path`.
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or("image/png", mime_from_extension)
}

/// Whether `path` ends in a known image extension (case-insensitive).
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Per-run generator of unique output filenames.
///
/// Names have the shape `<YYYYMMDDHHMMSS><millis:03>_<counter><ext>`. The
/// counter starts at zero for every new sequence and is bumped before each
/// name, so the first name ends in `_1`. Two names from the same sequence
/// never collide even when the clock reads the same millisecond; names from
/// different runs may.
#[derive(Debug, Default)]
pub struct NameSequence {
    counter: AtomicU64,
}

impl NameSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique name for `ext`, stamped with the current local time.
    pub fn next_name(&self, ext: &str) -> String {
        self.name_at(ext, Local::now())
    }

    /// Next unique name for `ext`, stamped with `now`.
    pub fn name_at(&self, ext: &str, now: DateTime<Local>) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!(
            "{}{:03}_{}{}",
            now.format("%Y%m%d%H%M%S"),
            now.timestamp_subsec_millis() % 1000,
            n,
            ext
        )
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

/// First free `base.N.ext` next to `path`, probing N = 1, 2, 3, …
///
/// The probe is unbounded; it stops at the first name that does not exist.
pub fn numbered_fallback(path: &Path) -> PathBuf {
    let stem = path.with_extension("");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let mut n: u64 = 1;
    loop {
        let mut candidate = stem.clone().into_os_string();
        candidate.push(format!(".{n}{ext}"));
        let candidate = PathBuf::from(candidate);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
