//! Remote input: download an image URL and persist it as a local file.
//!
//! The download itself is the only network I/O in the crate. Persisting is a
//! separate synchronous step so the naming rules can be exercised without a
//! server. Downloaded bytes must sniff as an image before anything is written.

use crate::error::B64Error;
use crate::pipeline::save::ensure_dir;
use crate::pipeline::{naming, sniff};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name used when the URL path carries no usable image file name.
pub const FALLBACK_STEM: &str = "downloaded_image";

/// Check if the input string is an `http` or `https` URL.
pub fn is_url(input: &str) -> bool {
    reqwest::Url::parse(input).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Fetch `url` and return the response body.
///
/// Any non-2xx status is an error; so is exceeding `timeout_secs`.
pub async fn download_url(url: &str, timeout_secs: u64) -> Result<Vec<u8>, B64Error> {
    info!("Downloading from URL: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| B64Error::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| network_error(url, timeout_secs, e))?;

    if !response.status().is_success() {
        return Err(B64Error::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| network_error(url, timeout_secs, e))?;
    debug!("Downloaded {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

fn network_error(url: &str, timeout_secs: u64, e: reqwest::Error) -> B64Error {
    if e.is_timeout() {
        B64Error::DownloadTimeout {
            url: url.to_string(),
            secs: timeout_secs,
        }
    } else {
        B64Error::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Validate downloaded `bytes` and write them under a name derived from `url`.
///
/// Written into `output_dir` (created if needed) or the current directory.
pub fn persist_download(url: &str, bytes: &[u8], output_dir: Option<&Path>) -> Result<PathBuf, B64Error> {
    let format = sniff::detect(bytes).ok_or_else(|| B64Error::UnrecognizedContent {
        what: format!("downloaded content from '{url}'"),
    })?;
    info!(
        "Downloaded {} bytes, detected as {}",
        bytes.len(),
        format.mime_type()
    );

    let dir = match output_dir {
        Some(dir) => {
            ensure_dir(dir)?;
            dir.to_path_buf()
        }
        None => PathBuf::from("."),
    };

    let path = dir.join(download_filename(url, format.extension()));
    std::fs::write(&path, bytes).map_err(|source| B64Error::WriteFailed {
        path: path.clone(),
        source,
    })?;
    info!("Saved original image: {}", path.display());
    Ok(path)
}

/// File name for a download: the URL's last path segment with its extension
/// corrected to `detected_ext`, or `downloaded_image<ext>` when the segment
/// is missing or is not an image file name.
pub fn download_filename(url: &str, detected_ext: &str) -> String {
    let segment = reqwest::Url::parse(url).ok().and_then(|parsed| {
        parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|last| !last.is_empty())
            .map(str::to_string)
    });

    match segment {
        Some(name) if naming::is_image_path(Path::new(&name)) => {
            let current = Path::new(&name)
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                .unwrap_or_default();
            if current == detected_ext {
                name
            } else {
                let stem = Path::new(&name)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{stem}{detected_ext}")
            }
        }
        _ => format!("{FALLBACK_STEM}{detected_ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00";

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/pic.jpg"));
        assert!(is_url("http://example.com/pic.jpg"));
        assert!(is_url("HTTP://EXAMPLE.COM/"));
        assert!(!is_url("ftp://example.com/pic.jpg"));
        assert!(!is_url("/tmp/pic.jpg"));
        assert!(!is_url("pic.jpg"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_from_url_path() {
        assert_eq!(download_filename("https://x.io/a/cat.gif", ".gif"), "cat.gif");
        assert_eq!(download_filename("https://x.io/a/cat.gif?size=2", ".gif"), "cat.gif");
    }

    #[test]
    fn filename_extension_corrected_to_content() {
        assert_eq!(download_filename("https://x.io/cat.png", ".jpg"), "cat.jpg");
        assert_eq!(download_filename("https://x.io/cat.jpeg", ".jpg"), "cat.jpg");
        assert_eq!(download_filename("https://x.io/CAT.JPG", ".jpg"), "CAT.JPG");
    }

    #[test]
    fn filename_fallback() {
        assert_eq!(download_filename("https://x.io/", ".png"), "downloaded_image.png");
        assert_eq!(download_filename("https://x.io", ".webp"), "downloaded_image.webp");
        assert_eq!(
            download_filename("https://x.io/render?id=3", ".gif"),
            "downloaded_image.gif"
        );
    }

    #[test]
    fn persist_writes_into_output_dir() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("dl");
        let path = persist_download("https://x.io/anim.png", GIF, Some(&out)).unwrap();
        assert_eq!(path, out.join("anim.gif"));
        assert_eq!(std::fs::read(&path).unwrap(), GIF);
    }

    #[test]
    fn persist_rejects_non_images() {
        let tmp = TempDir::new().unwrap();
        let err = persist_download("https://x.io/page.png", b"<html></html>", Some(tmp.path())).unwrap_err();
        assert!(matches!(err, B64Error::UnrecognizedContent { .. }));
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
    }
}
