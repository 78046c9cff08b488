//! Configuration for a processing run.
//!
//! Everything a run needs beyond the input itself lives in
//! [`ProcessConfig`], built via [`ProcessConfigBuilder`]. The config also owns
//! the run's [`NameSequence`], so every payload saved through the same config
//! (or its clones) gets a distinct file name.

use crate::confirm::{NeverOverwrite, OverwriteHook};
use crate::error::B64Error;
use crate::pipeline::naming::NameSequence;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for [`crate::process`] and friends.
///
/// # Example
/// ```rust
/// use b64_image::ProcessConfig;
///
/// let config = ProcessConfig::builder()
///     .output_dir("out")
///     .pretty_json(true)
///     .build()
///     .unwrap();
/// assert!(config.pretty_json);
/// ```
#[derive(Clone)]
pub struct ProcessConfig {
    /// Where output files go. Default: `None`.
    ///
    /// `None` means: embedded payloads go to `./decoded`, sidecars and decoded
    /// images go next to their source file, downloads go to the current
    /// directory.
    pub output_dir: Option<PathBuf>,

    /// Indent rewritten JSON with two spaces instead of compact output. Default: false.
    ///
    /// Ignored (with a warning) for non-JSON input.
    pub pretty_json: bool,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Asked before a decoded image overwrites an existing file.
    /// Default: [`NeverOverwrite`].
    pub overwrite: OverwriteHook,

    /// Shared per-run file name generator.
    pub names: Arc<NameSequence>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            pretty_json: false,
            download_timeout_secs: 120,
            overwrite: Arc::new(NeverOverwrite),
            names: Arc::new(NameSequence::new()),
        }
    }
}

impl fmt::Debug for ProcessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessConfig")
            .field("output_dir", &self.output_dir)
            .field("pretty_json", &self.pretty_json)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("overwrite", &"<dyn OverwriteConfirm>")
            .field("names_issued", &self.names.issued())
            .finish()
    }
}

impl ProcessConfig {
    /// Create a new builder for `ProcessConfig`.
    pub fn builder() -> ProcessConfigBuilder {
        ProcessConfigBuilder {
            config: Self::default(),
        }
    }

    pub(crate) fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}

/// Builder for [`ProcessConfig`].
pub struct ProcessConfigBuilder {
    config: ProcessConfig,
}

impl ProcessConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn pretty_json(mut self, v: bool) -> Self {
        self.config.pretty_json = v;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn overwrite_confirm(mut self, hook: OverwriteHook) -> Self {
        self.config.overwrite = hook;
        self
    }

    /// Share a name sequence with another config.
    pub fn names(mut self, names: Arc<NameSequence>) -> Self {
        self.config.names = names;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessConfig, B64Error> {
        let c = &self.config;
        if c.download_timeout_secs == 0 {
            return Err(B64Error::InvalidConfig(
                "download timeout must be ≥ 1 second".into(),
            ));
        }
        if c.output_dir.as_ref().is_some_and(|d| d.as_os_str().is_empty()) {
            return Err(B64Error::InvalidConfig(
                "output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::AlwaysOverwrite;
    use std::path::Path;

    #[test]
    fn defaults() {
        let c = ProcessConfig::default();
        assert!(c.output_dir.is_none());
        assert!(!c.pretty_json);
        assert_eq!(c.download_timeout_secs, 120);
        assert!(!c.overwrite.confirm_overwrite(Path::new("x.png")));
    }

    #[test]
    fn builder_sets_fields() {
        let c = ProcessConfig::builder()
            .output_dir("/tmp/out")
            .pretty_json(true)
            .download_timeout_secs(5)
            .overwrite_confirm(Arc::new(AlwaysOverwrite))
            .build()
            .unwrap();
        assert_eq!(c.output_dir(), Some(Path::new("/tmp/out")));
        assert!(c.pretty_json);
        assert_eq!(c.download_timeout_secs, 5);
        assert!(c.overwrite.confirm_overwrite(Path::new("x.png")));
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ProcessConfig::builder().download_timeout_secs(0).build().unwrap_err();
        assert!(matches!(err, B64Error::InvalidConfig(_)));
    }

    #[test]
    fn empty_output_dir_rejected() {
        assert!(ProcessConfig::builder().output_dir("").build().is_err());
    }

    #[test]
    fn clones_share_the_name_sequence() {
        let a = ProcessConfig::default();
        let b = a.clone();
        a.names.next_name(".png");
        assert_eq!(b.names.issued(), 1);
    }

    #[test]
    fn debug_does_not_panic() {
        let s = format!("{:?}", ProcessConfig::default());
        assert!(s.contains("ProcessConfig"));
    }
}
