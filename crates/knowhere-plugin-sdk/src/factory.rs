//! Factory, configuration, and lifecycle contracts.

use serde_json::Value;

use crate::error::IndexError;
use crate::index::PluginIndex;
use crate::types::ExtensionInfo;

/// Per-extension object constructing index instances and their configuration
/// companions on demand.
pub trait PluginFactory: Send + Sync {
    /// Constructs a fresh index instance; `None` signals construction
    /// failure.
    fn create_index(&self) -> Option<Box<dyn PluginIndex>>;

    /// Constructs the configuration companion matching this extension's
    /// indexes; `None` signals construction failure.
    fn create_config(&self) -> Option<Box<dyn PluginConfig>>;

    /// Extension descriptor. Pure and side-effect-free by contract.
    fn plugin_info(&self) -> ExtensionInfo;
}

/// Validates and describes configuration documents for an extension's
/// indexes. Configuration itself travels as opaque JSON.
pub trait PluginConfig: Send + Sync {
    /// Validates a concrete configuration document.
    fn validate(&self, config: &Value) -> Result<(), IndexError>;

    /// Default configuration document.
    fn default_config(&self) -> Value;
}

/// Optional callbacks around extension lifetime events.
///
/// Every hook defaults to a no-op success. Hook failures are reported to the
/// host but never block loading or unloading of an otherwise valid
/// extension.
pub trait PluginLifecycle: Send + Sync {
    fn on_load(&self) -> Result<(), IndexError> {
        Ok(())
    }

    fn on_unload(&self) -> Result<(), IndexError> {
        Ok(())
    }

    /// Invoked when persisted data from `from_version` must be migrated to
    /// `to_version` of the contract.
    fn on_upgrade(&self, from_version: u32, to_version: u32) -> Result<(), IndexError> {
        let _ = (from_version, to_version);
        Ok(())
    }
}
