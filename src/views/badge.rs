//! Platform badge.
//!
//! Compact chips for the hardware and backend a bundle was generated on,
//! with a one-line summary for hover text.

use crate::model::PlatformInfo;

/// One colored chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeChip {
    /// Short label, e.g. `NVIDIA RTX 4090`
    pub label: String,
    /// Background color
    pub color: [u8; 3],
    /// Hover text
    pub title: String,
}

impl BadgeChip {
    /// Black or white, whichever reads better on the background.
    pub fn text_color(&self) -> [u8; 3] {
        let [r, g, b] = self.color;
        // Rec. 601 luma
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        if luma > 150.0 { [0, 0, 0] } else { [255, 255, 255] }
    }
}

/// Platform badge for the active bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformBadge {
    /// Accelerator chips followed by the backend chip
    pub chips: Vec<BadgeChip>,
    /// Full platform summary
    pub summary: String,
}

impl PlatformBadge {
    /// Build the badge. Nothing is shown without platform metadata.
    pub fn from_platform(platform: Option<&PlatformInfo>) -> Option<Self> {
        let platform = platform?;
        let mut chips = Vec::new();

        for gpu in &platform.accelerators {
            let vendor = gpu.vendor();
            let mut title = gpu.name.clone();
            if let Some(mb) = gpu.memory_mb {
                title.push_str(&format!(" ({} MB)", mb));
            }
            if let Some(driver) = &gpu.driver_version {
                title.push_str(&format!(", driver {}", driver));
            }
            chips.push(BadgeChip {
                label: chip_label(vendor.label(), &gpu.name),
                color: vendor.color(),
                title,
            });
        }

        if let Some(backend) = platform.backend() {
            chips.push(BadgeChip {
                label: backend.label().to_string(),
                color: backend.color(),
                title: format!("Compute backend: {}", backend.label()),
            });
        }

        Some(Self {
            chips,
            summary: platform.summary(),
        })
    }
}

/// Prefix the device name with the vendor unless it already carries it.
fn chip_label(vendor: &str, name: &str) -> String {
    if vendor.is_empty() || name.to_lowercase().contains(&vendor.to_lowercase()) {
        name.to_string()
    } else {
        format!("{} {}", vendor, name)
    }
}
