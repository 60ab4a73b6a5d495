//! Filesystem asset source (native only).

use std::future::Future;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use super::AssetSource;
use crate::error::FetchError;

/// Reads assets relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    /// Create a source rooted at a directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a URL-style asset path against the root, undoing the
    /// percent-encoding applied to image ids.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let relative = Path::new(decoded.as_ref());
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            self.root.join(relative)
        }
    }

    /// Read a file synchronously.
    pub fn read_text(&self, path: &str) -> Result<String, FetchError> {
        let full = self.resolve(path);
        let start = web_time::Instant::now();

        let result = std::fs::read_to_string(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::not_found(path),
            _ => FetchError::Io(format!("{}: {}", full.display(), e)),
        });

        log::debug!(
            "Read {:?} in {:.1} ms ({})",
            full,
            start.elapsed().as_secs_f64() * 1000.0,
            if result.is_ok() { "ok" } else { "failed" }
        );
        result
    }
}

impl AssetSource for FsSource {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> {
        let result = self.read_text(path);
        async move { result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"images": []}"#).unwrap();

        let source = FsSource::new(dir.path());
        assert_eq!(
            source.read_text("manifest.json").unwrap(),
            r#"{"images": []}"#
        );
        assert_eq!(
            source.read_text("nope.json"),
            Err(FetchError::not_found("nope.json"))
        );
    }

    #[test]
    fn test_encoded_id_reads_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("annotations")).unwrap();
        std::fs::write(
            dir.path().join("annotations").join("img 1#b_annotations.json"),
            "{}",
        )
        .unwrap();

        let layout = crate::model::PathLayout::default();
        let path = layout.bundle_path("img 1#b");
        assert_eq!(path, "annotations/img%201%23b_annotations.json");

        let source = FsSource::new(dir.path());
        assert_eq!(source.read_text(&path), Ok("{}".to_string()));
    }

    #[test]
    fn test_fetch_text_nested() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("annotations")).unwrap();
        std::fs::write(dir.path().join("annotations/a_annotations.json"), "{}").unwrap();

        let source = FsSource::new(dir.path());
        let text = pollster::block_on(source.fetch_text("annotations/a_annotations.json"));
        assert_eq!(text, Ok("{}".to_string()));
    }
}
