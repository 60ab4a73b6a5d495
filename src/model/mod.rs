//! Data models for the annotation viewer.

mod annotation;
mod image;
mod platform;
mod reference;

pub use annotation::{
    AnnotationBundle, BundleImage, BundleMetadata, ModelAnnotation, PerformanceMetrics,
    PromptAnnotation, TokenMetrics,
};
pub use image::{ImageRecord, PathLayout};
pub use platform::{AcceleratorVendor, ComputeBackend, GpuInfo, PlatformInfo};
pub use reference::{HumanReference, ReferenceSet};
