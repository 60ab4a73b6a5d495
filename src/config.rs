//! Viewer settings.
//!
//! Stored as versioned JSON: a file in the user's config directory on native
//! builds, a localStorage entry on the web. Every field except `version` may
//! be omitted and falls back to its default.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AUXILIARY_TAG_LINK, DEFAULT_MANIFEST_PATH, DEFAULT_THUMBNAIL_EXTENT};
use crate::model::PathLayout;
use crate::views::ViewMode;

/// Config format version; bumped on breaking changes.
pub const CONFIG_VERSION: u32 = 1;

/// File name of the native config file.
pub const CONFIG_FILE_NAME: &str = "annotation-viewer-config.json";

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Format version of the stored settings
    pub version: u32,

    /// Base path and asset path templates
    #[serde(default)]
    pub paths: PathLayout,

    /// Manifest location, relative to the base path
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// Optional human reference file, relative to the base path
    #[serde(default)]
    pub reference_path: Option<String>,

    /// Link shown when a prompt has no auxiliary tag
    #[serde(default = "default_auxiliary_tag_link")]
    pub auxiliary_tag_link: String,

    /// View mode used at startup
    #[serde(default)]
    pub default_view_mode: ViewMode,

    /// Width of one thumbnail in the strip
    #[serde(default = "default_thumbnail_extent")]
    pub thumbnail_extent: f32,

    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`, `off`)
    #[serde(default = "default_log_level")]
    pub log_level: log::LevelFilter,
}

fn default_manifest_path() -> String {
    DEFAULT_MANIFEST_PATH.to_string()
}

fn default_auxiliary_tag_link() -> String {
    DEFAULT_AUXILIARY_TAG_LINK.to_string()
}

fn default_thumbnail_extent() -> f32 {
    DEFAULT_THUMBNAIL_EXTENT
}

fn default_log_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

impl ViewerConfig {
    /// Configuration with every setting at its default.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            paths: PathLayout::default(),
            manifest_path: default_manifest_path(),
            reference_path: None,
            auxiliary_tag_link: default_auxiliary_tag_link(),
            default_view_mode: ViewMode::default(),
            thumbnail_extent: default_thumbnail_extent(),
            log_level: default_log_level(),
        }
    }

    /// Replace the base path.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.paths.base_path = base_path.into();
        self
    }

    /// Manifest location joined onto the base path.
    pub fn manifest_location(&self) -> String {
        self.paths.join(&self.manifest_path)
    }

    /// Reference file location joined onto the base path.
    pub fn reference_location(&self) -> Option<String> {
        self.reference_path.as_deref().map(|p| self.paths.join(p))
    }

    /// Pretty JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse settings, rejecting files written by a newer version.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ViewerConfig {
    /// `<config dir>/annotation-viewer/annotation-viewer-config.json`, or the
    /// same under `~/.config` when the platform has no config dir.
    pub fn default_path() -> Option<std::path::PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(base.join("annotation-viewer").join(CONFIG_FILE_NAME))
    }

    /// Read settings from a file.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Settings from the default path; None when absent or unreadable.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return None;
        }

        Self::load_from(&path)
            .map_err(|e| log::warn!("Ignoring config file {}: {}", path.display(), e))
            .ok()
    }

    /// Write settings to a file, creating parent directories.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!("Wrote configuration to {}", path.display());
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
impl ViewerConfig {
    const STORAGE_KEY: &'static str = "annotation-viewer-config";

    /// Settings from localStorage; None when absent or unparsable.
    pub fn load_from_local_storage() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let json = match storage.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::debug!("No stored configuration");
                return None;
            }
            Err(e) => {
                log::warn!("localStorage read failed: {:?}", e);
                return None;
            }
        };

        Self::from_json(&json)
            .map_err(|e| log::warn!("Ignoring stored configuration: {}", e))
            .ok()
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from reading or writing settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Malformed JSON
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Written by a newer version of the viewer
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// File could not be read or written
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ViewerConfig::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.manifest_location(), "manifest.json");
        assert_eq!(config.reference_location(), None);
        assert_eq!(config.log_level, log::LevelFilter::Info);
    }

    #[test]
    fn test_version_too_new() {
        let result = ViewerConfig::from_json(r#"{"version": 99}"#);
        assert!(matches!(
            result,
            Err(ConfigError::VersionTooNew { file_version: 99, .. })
        ));
    }

    #[test]
    fn test_partial_config() {
        let config = ViewerConfig::from_json(
            r#"{
                "version": 1,
                "paths": {"base_path": "data", "bundle_template": "ann/{id}.json"},
                "reference_path": "refs.json",
                "default_view_mode": "structured",
                "log_level": "debug"
            }"#,
        )
        .unwrap();
        assert_eq!(config.paths.bundle_path("img1"), "data/ann/img1.json");
        assert_eq!(config.paths.thumbnail_template, "thumbnails/{id}.jpg");
        assert_eq!(config.manifest_location(), "data/manifest.json");
        assert_eq!(config.reference_location().as_deref(), Some("data/refs.json"));
        assert_eq!(config.default_view_mode, ViewMode::Structured);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_with_base_path() {
        let config = ViewerConfig::new().with_base_path("https://example.org/data/");
        assert_eq!(
            config.manifest_location(),
            "https://example.org/data/manifest.json"
        );
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = ViewerConfig {
            thumbnail_extent: 128.0,
            log_level: log::LevelFilter::Warn,
            ..ViewerConfig::new().with_base_path("/srv/data")
        };
        config.save_to(&path).unwrap();

        let loaded = ViewerConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ViewerConfig::load_from(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
