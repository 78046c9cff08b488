//! Overwrite-confirmation hook for decoded sidecar output.
//!
//! Decoding `pic.raw.b64` wants to write `pic.png`. When that file already
//! exists the library asks an [`OverwriteConfirm`] implementation whether to
//! replace it; a `false` answer makes the decoder fall back to `pic.1.png`,
//! `pic.2.png`, … instead.
//!
//! The library never touches stdin itself. The `b64` binary plugs in an
//! interactive prompt; library callers choose [`NeverOverwrite`] (the
//! default) or [`AlwaysOverwrite`], or supply their own.
//!
//! # Example
//!
//! ```rust
//! use b64_image::{OverwriteConfirm, ProcessConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct OnlyScratch;
//!
//! impl OverwriteConfirm for OnlyScratch {
//!     fn confirm_overwrite(&self, path: &Path) -> bool {
//!         path.starts_with("/tmp")
//!     }
//! }
//!
//! let config = ProcessConfig::builder()
//!     .overwrite_confirm(Arc::new(OnlyScratch))
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Decides whether an existing output file may be replaced.
pub trait OverwriteConfirm: Send + Sync {
    /// `true` to overwrite `path`, `false` to pick a numbered fallback name.
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Never overwrite; always fall back to a numbered name.
///
/// This is the default when no hook is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverOverwrite;

impl OverwriteConfirm for NeverOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        false
    }
}

/// Always overwrite existing files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOverwrite;

impl OverwriteConfirm for AlwaysOverwrite {
    fn confirm_overwrite(&self, _path: &Path) -> bool {
        true
    }
}

/// Convenience alias matching the type stored in [`crate::config::ProcessConfig`].
pub type OverwriteHook = Arc<dyn OverwriteConfirm>;

/// Interpret a typed answer to an overwrite prompt (`y` / `yes`, any case).
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
