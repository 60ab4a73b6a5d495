//! Platform information recorded by the annotation producer.

use serde::{Deserialize, Serialize};

/// A GPU or other accelerator present during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    /// Device name as reported by the driver
    pub name: String,
    /// Vendor code (`nvidia`, `amd`, `intel`, `apple`)
    #[serde(default)]
    pub vendor: String,
    /// Dedicated memory in MiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    /// Driver version string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_version: Option<String>,
}

impl GpuInfo {
    /// Parsed vendor code.
    pub fn vendor(&self) -> AcceleratorVendor {
        AcceleratorVendor::from_code(&self.vendor)
    }
}

/// Host the annotations were generated on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformInfo {
    /// Operating system name
    #[serde(default)]
    pub os_name: String,
    /// Operating system release
    #[serde(default)]
    pub os_version: String,
    /// Version of the producer's runtime
    #[serde(default, alias = "runtime_version")]
    pub python_version: String,
    /// Detected accelerators, in detection order
    #[serde(default)]
    pub accelerators: Vec<GpuInfo>,
    /// Compute backend code (`cuda`, `rocm`, `mps`, `oneapi`, `cpu`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_backend: Option<String>,
}

impl PlatformInfo {
    /// Parsed compute backend, if recorded.
    pub fn backend(&self) -> Option<ComputeBackend> {
        self.compute_backend.as_deref().map(ComputeBackend::from_code)
    }

    /// One-line human readable summary.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        let os = format!("{} {}", self.os_name, self.os_version);
        if !os.trim().is_empty() {
            parts.push(os.trim().to_string());
        }
        if !self.python_version.is_empty() {
            parts.push(format!("Python {}", self.python_version));
        }
        if self.accelerators.is_empty() {
            parts.push("No GPU detected".to_string());
        } else {
            let names: Vec<&str> = self.accelerators.iter().map(|g| g.name.as_str()).collect();
            parts.push(format!("GPU: {}", names.join(", ")));
        }
        if let Some(backend) = &self.compute_backend {
            parts.push(format!("Backend: {}", backend));
        }

        parts.join(" | ")
    }
}

/// Known accelerator vendors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceleratorVendor {
    Nvidia,
    Amd,
    Intel,
    Apple,
    /// Unrecognized vendor code, kept verbatim
    Other(String),
}

impl AcceleratorVendor {
    /// Parse a vendor code, case-insensitively.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "nvidia" => Self::Nvidia,
            "amd" | "ati" => Self::Amd,
            "intel" => Self::Intel,
            "apple" => Self::Apple,
            _ => Self::Other(code.trim().to_string()),
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Nvidia => "NVIDIA",
            Self::Amd => "AMD",
            Self::Intel => "Intel",
            Self::Apple => "Apple",
            Self::Other(code) => code,
        }
    }

    /// Brand color.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Nvidia => [118, 185, 0],
            Self::Amd => [237, 28, 36],
            Self::Intel => [0, 113, 197],
            Self::Apple => [162, 170, 173],
            Self::Other(_) => [128, 128, 128],
        }
    }
}

/// Known compute backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComputeBackend {
    Cuda,
    Rocm,
    Mps,
    OneApi,
    Cpu,
    /// Unrecognized backend code, kept verbatim
    Other(String),
}

impl ComputeBackend {
    /// Parse a backend code, case-insensitively.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "cuda" => Self::Cuda,
            "rocm" => Self::Rocm,
            "mps" | "metal" => Self::Mps,
            "oneapi" => Self::OneApi,
            "cpu" => Self::Cpu,
            _ => Self::Other(code.trim().to_string()),
        }
    }

    /// Display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Cuda => "CUDA",
            Self::Rocm => "ROCm",
            Self::Mps => "Metal",
            Self::OneApi => "oneAPI",
            Self::Cpu => "CPU",
            Self::Other(code) => code,
        }
    }

    /// Badge color.
    pub fn color(&self) -> [u8; 3] {
        match self {
            Self::Cuda => [118, 185, 0],
            Self::Rocm => [237, 28, 36],
            Self::Mps => [162, 170, 173],
            Self::OneApi => [0, 113, 197],
            Self::Cpu => [96, 125, 139],
            Self::Other(_) => [128, 128, 128],
        }
    }
}
