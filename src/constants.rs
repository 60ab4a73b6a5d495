//! Global constants for the annotation viewer

/// Placeholder replaced by the image id in path templates
pub const ID_PLACEHOLDER: &str = "{id}";

/// Default manifest location, relative to the base path
pub const DEFAULT_MANIFEST_PATH: &str = "manifest.json";

/// Default thumbnail path template
pub const DEFAULT_THUMBNAIL_TEMPLATE: &str = "thumbnails/{id}.jpg";

/// Default full-resolution image path template
pub const DEFAULT_IMAGE_TEMPLATE: &str = "images/{id}.jpg";

/// Default annotation bundle path template
pub const DEFAULT_BUNDLE_TEMPLATE: &str = "annotations/{id}_annotations.json";

/// Where users are sent when a prompt has no auxiliary tag yet
pub const DEFAULT_AUXILIARY_TAG_LINK: &str = "https://hedtools.org/hed/";

/// Width of one thumbnail in the strip, in logical pixels
pub const DEFAULT_THUMBNAIL_EXTENT: f32 = 96.0;

/// Visible width of the thumbnail strip before the first resize event
pub const DEFAULT_STRIP_VIEWPORT: f32 = 960.0;

/// File pattern used by the reporting commands
pub const DEFAULT_REPORT_PATTERN: &str = "*_annotations.json";

/// Prompt keys every model is expected to answer, in dashboard order
pub const DEFAULT_EXPECTED_PROMPTS: &[&str] = &[
    "general_description",
    "foreground_background",
    "entities_interactions",
    "mood_emotions",
    "structured_inventory",
];
