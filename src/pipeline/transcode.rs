//! File transcoder: image file ⇄ `.raw.b64` / `.mime.b64` sidecars.
//!
//! Encoding trusts the image's extension for the MIME type; decoding trusts
//! content sniffing whenever the sidecar's own claim is missing or is the
//! generic `.png` default.

use crate::confirm::OverwriteConfirm;
use crate::error::B64Error;
use crate::pipeline::save::ensure_dir;
use crate::pipeline::{codec, naming, sniff};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Delimiter between MIME type and payload in framed sidecars.
pub const MIME_DELIMITER: &str = ";base64,";

/// Maximum payload characters sampled by [`probe_generic_b64`].
pub const PROBE_SAMPLE_LEN: usize = 4096;

/// Sidecar flavour, recognised by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SidecarKind {
    /// `name.mime.b64`: `<mime>;base64,<payload>`
    Mime,
    /// `name.raw.b64`: payload only
    Raw,
    /// `name.b64`: either of the above
    Generic,
}

impl SidecarKind {
    /// Classify `path` by suffix. Longest suffix wins.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".mime.b64") {
            Some(SidecarKind::Mime)
        } else if name.ends_with(".raw.b64") {
            Some(SidecarKind::Raw)
        } else if name.ends_with(".b64") {
            Some(SidecarKind::Generic)
        } else {
            None
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            SidecarKind::Mime => ".mime.b64",
            SidecarKind::Raw => ".raw.b64",
            SidecarKind::Generic => ".b64",
        }
    }
}

/// The two sidecars produced by [`encode_image_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSidecars {
    pub raw_path: PathBuf,
    pub mime_path: PathBuf,
}

/// Encode an image file into `<stem>.raw.b64` and `<stem>.mime.b64`.
///
/// Output goes to `output_dir` (created if needed) or next to the source.
/// The source file is never modified.
pub fn encode_image_file(path: &Path, output_dir: Option<&Path>) -> Result<EncodedSidecars, B64Error> {
    let bytes = std::fs::read(path).map_err(|e| B64Error::from_read(path, e))?;
    let b64 = codec::encode(&bytes);
    let mime = naming::mime_from_path(path);

    let dir = match output_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            dir.to_path_buf()
        }
        None => source_dir(path),
    };

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let raw_path = dir.join(format!("{stem}.raw.b64"));
    let mime_path = dir.join(format!("{stem}.mime.b64"));

    write_file(&raw_path, b64.as_bytes())?;
    write_file(&mime_path, format!("{mime}{MIME_DELIMITER}{b64}").as_bytes())?;

    info!(
        "Encoded {} ({} bytes, {}) → {}, {}",
        path.display(),
        bytes.len(),
        mime,
        raw_path.display(),
        mime_path.display()
    );
    Ok(EncodedSidecars { raw_path, mime_path })
}

/// Decode a `.b64` / `.raw.b64` / `.mime.b64` sidecar back into an image file.
///
/// Returns the path actually written. When the target exists, `confirm`
/// decides between overwriting and a numbered fallback name.
pub fn decode_sidecar_file(
    path: &Path,
    output_dir: Option<&Path>,
    confirm: &dyn OverwriteConfirm,
) -> Result<PathBuf, B64Error> {
    let kind = SidecarKind::from_path(path).unwrap_or(SidecarKind::Generic);
    let content = read_sidecar(path)?;

    let (payload, claimed_ext) = match kind {
        SidecarKind::Mime => {
            let (mime, payload) =
                content
                    .split_once(MIME_DELIMITER)
                    .ok_or_else(|| B64Error::InvalidSidecar {
                        path: path.to_path_buf(),
                        kind: "mime.b64",
                    })?;
            (payload, Some(naming::extension_from_mime(mime)))
        }
        SidecarKind::Raw => (content.as_str(), Some(".png")),
        SidecarKind::Generic => match content.split_once(MIME_DELIMITER) {
            Some((mime, payload)) => (payload, Some(naming::extension_from_mime(mime))),
            None => (content.as_str(), None),
        },
    };

    let bytes = codec::decode(payload)?;
    let ext = resolve_extension(claimed_ext, &bytes);
    debug!(
        "Decoded {} ({:?}): {} bytes, claimed {:?}, resolved {}",
        path.display(),
        kind,
        bytes.len(),
        claimed_ext,
        ext
    );

    let base = base_name(path, kind);
    let dir = match output_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            dir.to_path_buf()
        }
        None => source_dir(path),
    };

    let mut target = dir.join(format!("{base}{ext}"));
    if target.exists() && !confirm.confirm_overwrite(&target) {
        target = naming::numbered_fallback(&target);
        debug!("Keeping existing file, writing {} instead", target.display());
    }

    write_file(&target, &bytes)?;
    info!("Decoded image saved to {}", target.display());
    Ok(target)
}

/// Pick the final extension for decoded bytes.
///
/// A claim other than `.png` is trusted. A `.png` claim (possibly just the
/// default) is overridden by a sniffed non-PNG format. With no claim at all
/// the sniffed extension is used, `.png` included.
pub fn resolve_extension(claimed: Option<&'static str>, bytes: &[u8]) -> &'static str {
    match claimed {
        Some(ext) if ext != ".png" => ext,
        Some(ext) => match sniff::extension_for(bytes) {
            ".png" => ext,
            sniffed => sniffed,
        },
        None => sniff::extension_for(bytes),
    }
}

/// Whether a generic `.b64` file holds base64 image content.
///
/// Samples at most [`PROBE_SAMPLE_LEN`] payload characters, after removing an
/// optional `<mime>;base64,` prefix and line breaks, and sniffs the decoded
/// sample. Corruption past the sample is only caught by the full decode.
pub fn probe_generic_b64(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    probe_payload(&content)
}

pub(crate) fn probe_payload(content: &str) -> bool {
    let payload = content
        .split_once(MIME_DELIMITER)
        .map_or(content, |(_, payload)| payload);
    let payload = codec::strip_line_breaks(payload);

    let sample = if payload.len() > PROBE_SAMPLE_LEN {
        // whole 4-character groups only, so the truncated sample still decodes
        let cut = PROBE_SAMPLE_LEN - PROBE_SAMPLE_LEN % 4;
        match payload.get(..cut) {
            Some(s) => s,
            None => return false,
        }
    } else {
        &payload[..]
    };

    codec::decode(sample).is_ok_and(|decoded| sniff::is_image_data(&decoded))
}

/// Read a sidecar as text. Bytes that are not UTF-8 cannot be base64, so
/// they are reported as a decode error at their offset.
fn read_sidecar(path: &Path) -> Result<String, B64Error> {
    let bytes = std::fs::read(path).map_err(|e| B64Error::from_read(path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        let offset = e.utf8_error().valid_up_to();
        let byte = e.as_bytes().get(offset).copied().unwrap_or_default();
        B64Error::MalformedBase64(base64::DecodeError::InvalidByte(offset, byte))
    })
}

fn base_name(path: &Path, kind: SidecarKind) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(kind.suffix())
        .map(str::to_string)
        .unwrap_or(name)
}

fn source_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), B64Error> {
    std::fs::write(path, bytes).map_err(|source| B64Error::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
