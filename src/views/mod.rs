//! Presentation models for the dashboard.
//!
//! Everything here is platform independent; the egui front-end and the
//! `show` command only lay these models out:
//! - annotation: selected annotation, metrics and empty states
//! - structured: nested JSON tree with humanized keys
//! - badge: platform chips

mod annotation;
mod badge;
mod structured;

use serde::{Deserialize, Serialize};

pub use annotation::{
    AnnotationPanel, AnnotationView, AuxiliaryTag, EmptyState, MetricLine, format_count,
    format_duration_ms,
};
pub use badge::{BadgeChip, PlatformBadge};
pub use structured::{NodeContent, StructuredNode, humanize_key, strip_code_fence, structured_data};

/// How the annotation response is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Raw response text
    #[default]
    Text,
    /// Parsed JSON tree
    Structured,
}

impl ViewMode {
    /// The other mode.
    pub fn toggle(self) -> Self {
        match self {
            Self::Text => Self::Structured,
            Self::Structured => Self::Text,
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Structured => "Structured",
        }
    }
}
