//! Image records and the path layout they are derived from.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BUNDLE_TEMPLATE, DEFAULT_IMAGE_TEMPLATE, DEFAULT_THUMBNAIL_TEMPLATE, ID_PLACEHOLDER,
};

/// Characters escaped when an image id is placed into a path: everything a URL
/// would read as a delimiter, plus path separators so an id names one file.
const ID_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\');

/// Where image assets and annotation bundles live relative to a base path.
///
/// Templates contain `{id}`, which is replaced by the percent-encoded image id.
/// Paths are URL-style strings; the filesystem source decodes them again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathLayout {
    /// Prefix joined in front of every relative path (may be empty)
    #[serde(default)]
    pub base_path: String,

    /// Template for thumbnail images
    #[serde(default = "default_thumbnail_template")]
    pub thumbnail_template: String,

    /// Template for full-resolution images
    #[serde(default = "default_image_template")]
    pub image_template: String,

    /// Template for per-image annotation bundles
    #[serde(default = "default_bundle_template")]
    pub bundle_template: String,
}

fn default_thumbnail_template() -> String {
    DEFAULT_THUMBNAIL_TEMPLATE.to_string()
}

fn default_image_template() -> String {
    DEFAULT_IMAGE_TEMPLATE.to_string()
}

fn default_bundle_template() -> String {
    DEFAULT_BUNDLE_TEMPLATE.to_string()
}

impl Default for PathLayout {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            thumbnail_template: default_thumbnail_template(),
            image_template: default_image_template(),
            bundle_template: default_bundle_template(),
        }
    }
}

impl PathLayout {
    /// Create a layout with default templates under the given base path.
    pub fn with_base(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Join a relative path onto the base path.
    ///
    /// Absolute paths and full URLs are returned unchanged.
    pub fn join(&self, relative: &str) -> String {
        if self.base_path.is_empty() || relative.starts_with('/') || relative.contains("://") {
            return relative.to_string();
        }
        let relative = relative.trim_start_matches("./");
        format!("{}/{}", self.base_path.trim_end_matches('/'), relative)
    }

    /// Expand a template for an image id and join it onto the base path.
    pub fn resolve(&self, template: &str, id: &str) -> String {
        let encoded = utf8_percent_encode(id, ID_ESCAPES).to_string();
        self.join(&template.replace(ID_PLACEHOLDER, &encoded))
    }

    /// Path of the annotation bundle for an image id.
    pub fn bundle_path(&self, id: &str) -> String {
        self.resolve(&self.bundle_template, id)
    }
}

/// One navigable image, created once from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Image identifier, unique within the manifest
    pub id: String,
    /// Thumbnail path or URL
    pub thumbnail_path: String,
    /// Full-resolution image path or URL
    pub image_path: String,
    /// Annotation bundle path, valid even if the file does not exist yet
    pub bundle_path: String,
}

impl ImageRecord {
    /// Derive all asset paths for an image id.
    pub fn new(id: &str, layout: &PathLayout) -> Self {
        Self {
            id: id.to_string(),
            thumbnail_path: layout.resolve(&layout.thumbnail_template, id),
            image_path: layout.resolve(&layout.image_template, id),
            bundle_path: layout.bundle_path(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_paths_default_layout() {
        let record = ImageRecord::new("shared0001_nsd02951", &PathLayout::default());
        assert_eq!(record.id, "shared0001_nsd02951");
        assert_eq!(record.thumbnail_path, "thumbnails/shared0001_nsd02951.jpg");
        assert_eq!(record.image_path, "images/shared0001_nsd02951.jpg");
        assert_eq!(
            record.bundle_path,
            "annotations/shared0001_nsd02951_annotations.json"
        );
    }

    #[test]
    fn test_record_paths_with_base() {
        let layout = PathLayout::with_base("/data/nsd/");
        let record = ImageRecord::new("img7", &layout);
        assert_eq!(record.thumbnail_path, "/data/nsd/thumbnails/img7.jpg");
        assert_eq!(record.bundle_path, "/data/nsd/annotations/img7_annotations.json");
    }

    #[test]
    fn test_join_keeps_absolute_and_urls() {
        let layout = PathLayout::with_base("data");
        assert_eq!(layout.join("/abs/file.json"), "/abs/file.json");
        assert_eq!(
            layout.join("https://cdn.example.org/x.json"),
            "https://cdn.example.org/x.json"
        );
        assert_eq!(layout.join("./rel.json"), "data/rel.json");
    }

    #[test]
    fn test_id_is_percent_encoded() {
        let record = ImageRecord::new("img 1?#x", &PathLayout::default());
        assert_eq!(record.thumbnail_path, "thumbnails/img%201%3F%23x.jpg");
        assert_eq!(record.bundle_path, "annotations/img%201%3F%23x_annotations.json");
        // The record keeps the raw id for lookups
        assert_eq!(record.id, "img 1?#x");

        let nested = ImageRecord::new("../etc/passwd", &PathLayout::default());
        assert_eq!(nested.image_path, "images/..%2Fetc%2Fpasswd.jpg");

        let percent = ImageRecord::new("100%", &PathLayout::default());
        assert_eq!(percent.image_path, "images/100%25.jpg");
    }

    #[test]
    fn test_layout_deserialize_fills_defaults() {
        let layout: PathLayout = serde_json::from_str(r#"{"base_path": "web"}"#).unwrap();
        assert_eq!(layout.base_path, "web");
        assert_eq!(layout.bundle_template, DEFAULT_BUNDLE_TEMPLATE);
    }
}
