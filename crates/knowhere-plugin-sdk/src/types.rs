//! Descriptor types reported by extensions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable descriptor identifying an extension.
///
/// `name` is the identity key. Uniqueness is enforced when the extension is
/// published, not when the library is opened, so two libraries declaring the
/// same name only collide at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    /// Declared extension name (identity key).
    pub name: String,
    /// Version string, opaque to the host; compatibility is decided by
    /// `abi_version` alone.
    pub version: String,
    /// Author or maintainer.
    #[serde(default)]
    pub author: String,
    /// Short description.
    #[serde(default)]
    pub description: String,
    /// License (SPDX identifier).
    #[serde(default)]
    pub license: String,
    /// Contract version the extension was built against.
    pub abi_version: u32,
}

impl ExtensionInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            author: String::new(),
            description: String::new(),
            license: String::new(),
            abi_version: crate::abi::PLUGIN_API_VERSION,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }
}

/// Capability flags an extension declares, reported per index instance to
/// allow instance-conditional capabilities.
///
/// The boolean flags project onto the index registry's tag vocabulary where
/// one exists; flags and list entries without a tag are dropped silently, so
/// newer extensions stay loadable by older hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFeatures {
    pub supports_gpu: bool,
    pub supports_mmap: bool,
    pub supports_range_search: bool,
    pub supports_iterator: bool,
    pub supports_disk_storage: bool,
    /// Distance metrics the index accepts (e.g. "L2", "IP").
    #[serde(default)]
    pub supported_metrics: Vec<String>,
    /// Element types the index accepts (e.g. "float32").
    #[serde(default)]
    pub supported_data_types: Vec<String>,
}

/// Self-reported health of an index instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
    Unknown,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "healthy"),
            Self::Degraded => write!(f, "degraded"),
            Self::Unhealthy => write!(f, "unhealthy"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
