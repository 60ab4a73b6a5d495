//! Manifest loading: the ordered list of images to browse.
//!
//! Loading fails soft. Any fetch or parse error leaves an empty image list
//! and a `Failed` state for the UI to explain; nothing is retried.

use serde::{Deserialize, Serialize};

use crate::error::{FetchError, ViewerError};
use crate::model::{ImageRecord, PathLayout};
use crate::source::AssetSource;

/// Manifest document: `{ "images": [..] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Image ids in navigation order
    pub images: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("images").is_none() {
            return Err(ViewerError::invalid_manifest("missing 'images' field"));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Build one record per image name, in manifest order.
    ///
    /// Blank names are skipped with a warning.
    pub fn records(&self, layout: &PathLayout) -> Vec<ImageRecord> {
        self.images
            .iter()
            .filter_map(|name| {
                let name = name.trim();
                if name.is_empty() {
                    log::warn!("Skipping blank image name in manifest");
                    None
                } else {
                    Some(ImageRecord::new(name, layout))
                }
            })
            .collect()
    }
}

/// Loading state of the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ManifestState {
    /// Fetch not finished yet
    #[default]
    Loading,
    /// Loaded with this many images
    Ready(usize),
    /// Fetch or parse failed; the session has no images
    Failed(String),
}

impl ManifestState {
    /// Check if loading failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Result of interpreting a manifest fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLoad {
    /// Images in navigation order (empty on failure)
    pub images: Vec<ImageRecord>,
    /// Resulting state
    pub state: ManifestState,
}

impl ManifestLoad {
    /// Interpret a fetch result. Never panics, never propagates.
    pub fn from_fetch(result: Result<String, FetchError>, layout: &PathLayout) -> Self {
        let parsed = result
            .map_err(ViewerError::from)
            .and_then(|text| Manifest::from_json(&text));

        match parsed {
            Ok(manifest) => {
                let images = manifest.records(layout);
                log::info!("Loaded manifest with {} images", images.len());
                Self {
                    state: ManifestState::Ready(images.len()),
                    images,
                }
            }
            Err(e) => {
                log::error!("Failed to load image manifest: {}", e);
                Self {
                    images: Vec::new(),
                    state: ManifestState::Failed(e.to_string()),
                }
            }
        }
    }
}

/// Fetch and interpret the manifest from a source.
pub async fn load_manifest<S: AssetSource>(
    source: &S,
    path: &str,
    layout: &PathLayout,
) -> ManifestLoad {
    let result = source.fetch_text(path).await;
    ManifestLoad::from_fetch(result, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json(r#"{"images": ["a", "b", "c"]}"#).unwrap();
        assert_eq!(manifest.images, vec!["a", "b", "c"]);

        let records = manifest.records(&PathLayout::default());
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].bundle_path, "annotations/b_annotations.json");
    }

    #[test]
    fn test_missing_images_field() {
        let err = Manifest::from_json(r#"{"files": []}"#).unwrap_err();
        assert!(matches!(err, ViewerError::InvalidManifest { .. }));
    }

    #[test]
    fn test_blank_names_skipped() {
        let manifest = Manifest::from_json(r#"{"images": ["a", " ", ""]}"#).unwrap();
        assert_eq!(manifest.records(&PathLayout::default()).len(), 1);
    }

    #[test]
    fn test_http_500_yields_empty_failed_state() {
        let source = MemorySource::new().with_error(
            "manifest.json",
            FetchError::http(500, "manifest.json"),
        );
        let load = pollster::block_on(load_manifest(
            &source,
            "manifest.json",
            &PathLayout::default(),
        ));
        assert!(load.images.is_empty());
        assert!(load.state.is_failed());
    }

    #[test]
    fn test_malformed_manifest_yields_failed_state() {
        let load = ManifestLoad::from_fetch(Ok("not json".to_string()), &PathLayout::default());
        assert!(load.images.is_empty());
        assert!(matches!(load.state, ManifestState::Failed(_)));
    }

    #[test]
    fn test_successful_load() {
        let source = MemorySource::new().with_file("m.json", r#"{"images": ["x", "y"]}"#);
        let load = pollster::block_on(load_manifest(&source, "m.json", &PathLayout::default()));
        assert_eq!(load.state, ManifestState::Ready(2));
        assert_eq!(load.images[0].id, "x");
    }
}
