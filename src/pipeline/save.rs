//! Save-payload: decode one embedded base64 payload into a uniquely named file.
//!
//! Shared by the JSON walker and the text pass. The returned reference is
//! what gets substituted back into the document: `<dir-basename>/<name>`.

use crate::error::B64Error;
use crate::pipeline::{codec, naming, naming::NameSequence};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Directory used when no output directory is configured.
pub const DEFAULT_DECODED_DIR: &str = "decoded";

/// A payload written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedPayload {
    /// Full path of the written file.
    pub path: PathBuf,
    /// Relative reference substituted into the document.
    pub reference: String,
}

/// Writes decoded payloads into one directory using one name sequence.
#[derive(Debug)]
pub struct PayloadSaver<'a> {
    dir: PathBuf,
    names: &'a NameSequence,
}

impl<'a> PayloadSaver<'a> {
    /// Saver for `output_dir`, or `./decoded` when `None`.
    pub fn new(output_dir: Option<&Path>, names: &'a NameSequence) -> Self {
        let dir = output_dir.map_or_else(|| PathBuf::from(DEFAULT_DECODED_DIR), Path::to_path_buf);
        Self { dir, names }
    }

    /// Decode `base64_data` and write it with an extension derived from `mime`.
    ///
    /// Nothing is written when decoding fails. The directory is created on
    /// first use.
    pub fn save(&self, base64_data: &str, mime: &str) -> Result<SavedPayload, B64Error> {
        let bytes = codec::decode(base64_data)?;
        let ext = naming::extension_from_mime(mime);
        let filename = self.names.next_name(ext);

        ensure_dir(&self.dir)?;
        let path = self.dir.join(&filename);
        std::fs::write(&path, &bytes).map_err(|source| B64Error::WriteFailed {
            path: path.clone(),
            source,
        })?;
        info!("Saved {} ({} bytes, {})", path.display(), bytes.len(), mime);

        let reference = reference_for(&self.dir, filename);
        debug!("Payload reference: {}", reference);
        Ok(SavedPayload { path, reference })
    }
}

/// `<last component of dir>/<filename>`. A `..` or root component is kept
/// as written; a trailing `.` or an empty dir adds nothing.
fn reference_for(dir: &Path, filename: String) -> String {
    match dir.components().next_back() {
        Some(Component::Normal(base)) => format!("{}/{}", base.to_string_lossy(), filename),
        Some(Component::ParentDir) => format!("../{filename}"),
        Some(Component::RootDir) => format!("/{filename}"),
        _ => filename,
    }
}

/// Create `dir` and its parents if missing (0755 on Unix).
pub(crate) fn ensure_dir(dir: &Path) -> Result<(), B64Error> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(dir)
        .map_err(|source| B64Error::CreateDirFailed {
            path: dir.to_path_buf(),
            source,
        })
}
