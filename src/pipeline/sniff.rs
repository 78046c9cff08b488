//! Image sniffing: classify bytes by their magic signature.
//!
//! Only the leading bytes are consulted; filenames and claimed MIME types
//! are never trusted here. Signatures are disjoint so rule order never
//! changes the answer for a real image; it only matters for garbage input.

use serde::{Deserialize, Serialize};

/// Number of leading bytes scanned for an SVG/XML opening tag.
const SVG_SCAN_LEN: usize = 100;

/// An image format recognised by [`detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Svg,
}

impl ImageFormat {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => ".png",
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Gif => ".gif",
            ImageFormat::Webp => ".webp",
            ImageFormat::Bmp => ".bmp",
            ImageFormat::Svg => ".svg",
        }
    }

    /// Canonical MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::Svg => "image/svg+xml",
        }
    }
}

/// Detect the image format of `data` from its signature.
///
/// Returns `None` for fewer than 2 bytes or when no rule matches.
///
/// | Format | Signature |
/// |--------|-----------|
/// | PNG  | `89 50 4E 47` (needs the full 8-byte header length) |
/// | JPEG | `FF D8 FF` |
/// | GIF  | `GIF8` |
/// | WEBP | `RIFF` at 0 and `WEBP` at 8 |
/// | BMP  | `BM` |
/// | SVG  | starts with `<`, first 100 bytes contain `<svg` or `<?xml` |
pub fn detect(data: &[u8]) -> Option<ImageFormat> {
    if data.len() < 2 {
        return None;
    }

    if data.len() >= 8 && data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some(ImageFormat::Png);
    }
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(ImageFormat::Jpeg);
    }
    if data.starts_with(b"GIF8") {
        return Some(ImageFormat::Gif);
    }
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some(ImageFormat::Webp);
    }
    if data.starts_with(b"BM") {
        return Some(ImageFormat::Bmp);
    }
    if data[0] == b'<' {
        let head = &data[..data.len().min(SVG_SCAN_LEN)];
        if contains(head, b"<svg") || contains(head, b"<?xml") {
            return Some(ImageFormat::Svg);
        }
    }

    None
}

/// Whether `data` carries any recognised image signature.
pub fn is_image_data(data: &[u8]) -> bool {
    detect(data).is_some()
}

/// Extension for the sniffed format of `data`.
///
/// Unknown content falls back to `.png`. Callers that need to tell the
/// difference must use [`detect`] directly.
pub fn extension_for(data: &[u8]) -> &'static str {
    detect(data).map_or(".png", ImageFormat::extension)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
