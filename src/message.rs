//! Dashboard message and command types.
//!
//! All UI events and fetch completions are represented as messages in the Elm
//! architecture style. The dashboard answers each message with commands that
//! the platform driver carries out (fetching, aborting, clipboard writes).

use crate::cache::FetchTicket;
use crate::error::FetchError;
use crate::views::ViewMode;

/// Messages that can be sent to update dashboard state.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Loading
    /// Manifest fetch finished
    ManifestFetched(Result<String, FetchError>),
    /// Human reference fetch finished
    ReferencesFetched(Result<String, FetchError>),
    /// Bundle fetch finished
    BundleFetched {
        /// Ticket issued when the fetch started
        ticket: FetchTicket,
        /// File contents or the failure
        result: Result<String, FetchError>,
    },

    // Navigation
    /// Navigate to previous image
    PrevImage,
    /// Navigate to next image
    NextImage,
    /// Thumbnail clicked
    JumpTo(usize),
    /// Position slider moved (0..=1)
    ScrubTo(f32),
    /// Thumbnail strip width changed
    ViewportResized(f32),

    // Selection
    /// Model chosen from the model list
    SelectModel(String),
    /// Prompt type chosen from the prompt list
    SelectPrompt(String),

    // Annotation viewer
    /// Switch between text and structured view
    ToggleViewMode,
    /// Set the view mode explicitly
    SetViewMode(ViewMode),
    /// Copy the displayed representation
    Copy,
}

/// Side effects requested by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the manifest; answer with [`Message::ManifestFetched`]
    FetchManifest {
        /// Manifest location
        path: String,
    },
    /// Fetch the reference file; answer with [`Message::ReferencesFetched`]
    FetchReferences {
        /// Reference file location
        path: String,
    },
    /// Fetch a bundle; answer with [`Message::BundleFetched`]
    FetchBundle {
        /// Ticket to hand back with the result
        ticket: FetchTicket,
        /// Bundle location
        path: String,
    },
    /// Cancel an in-flight bundle fetch
    AbortFetch(FetchTicket),
    /// Write text to the clipboard
    CopyToClipboard(String),
}
