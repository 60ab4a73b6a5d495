//! Error types for loading manifests, bundles and reference data.

use thiserror::Error;

/// Errors produced by an asset source while fetching a file.
///
/// Cloneable so that fetch results can travel inside UI messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The file does not exist (HTTP 404 or missing on disk)
    #[error("Not found: {path}")]
    NotFound {
        /// Requested path
        path: String,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} while fetching {path}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested path
        path: String,
    },

    /// Transport-level failure (offline, CORS, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// Local I/O failure
    #[error("IO error: {0}")]
    Io(String),

    /// The request was cancelled because a newer one superseded it
    #[error("Request aborted")]
    Aborted,
}

impl FetchError {
    /// Create a not-found error for a path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create an HTTP status error for a path.
    pub fn http(status: u16, path: impl Into<String>) -> Self {
        Self::Http {
            status,
            path: path.into(),
        }
    }

    /// Whether this error came from a superseded request.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Errors that can occur while interpreting viewer data files.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The underlying fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The manifest parsed but its content is unusable
    #[error("Invalid manifest: {message}")]
    InvalidManifest {
        /// Description of the problem
        message: String,
    },

    /// An image id that is not part of the manifest
    #[error("Unknown image: {id}")]
    UnknownImage {
        /// The id that was looked up
        id: String,
    },
}

impl ViewerError {
    /// Create an invalid manifest error with a message.
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
        }
    }

    /// Create an unknown image error.
    pub fn unknown_image(id: impl Into<String>) -> Self {
        Self::UnknownImage { id: id.into() }
    }
}
