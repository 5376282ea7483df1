//! Host-side error taxonomy for loading and registration.

use std::path::PathBuf;

use knowhere_plugin_sdk::IndexError;
use thiserror::Error;

/// Errors returned by the loader, bridge, and initialization helpers.
///
/// Failures come in two categories: fatal to the single call that produced
/// them, and conditions the batch entry points (`load_from_directory`,
/// `load_and_register`, `initialize_plugins`) downgrade to a logged skip.
/// Only the first category ever crosses a batch boundary.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Caller-supplied argument rejected (bad directory, unknown name, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The path is already tracked; unload it before loading again.
    #[error("already loaded: {0}")]
    AlreadyLoaded(PathBuf),

    /// Another loaded library already declared this extension name.
    #[error("duplicate extension name {name:?} (already provided by {existing})")]
    DuplicateName { name: String, existing: PathBuf },

    /// No extension with this name is currently loaded.
    #[error("extension not loaded: {0}")]
    NotLoaded(String),

    /// The platform loader could not open the library; `detail` carries its
    /// diagnostic string.
    #[error("failed to open {path}: {detail}")]
    OpenFailed { path: PathBuf, detail: String },

    /// A required entry point is absent from the library.
    #[error("missing symbol {symbol}: {detail}")]
    MissingSymbol {
        symbol: &'static str,
        detail: String,
    },

    /// The library reports a contract version other than the host's.
    #[error("ABI version mismatch: expected {expected}, found {found}")]
    IncompatibleAbi { expected: u32, found: u32 },

    /// A factory or index constructor returned nothing, or extension code
    /// panicked while the host was calling into it.
    #[error("construction failed: {0}")]
    ConstructionFailed(String),

    /// The extension is not registered with this bridge.
    #[error("extension not registered: {0}")]
    NotRegistered(String),

    /// The index registry refused the alias.
    #[error("registry rejected alias {0:?}")]
    AliasRejected(String),

    /// Contract-side failure reported by extension code.
    #[error(transparent)]
    Index(#[from] IndexError),
}

/// Result type for host operations.
pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::IncompatibleAbi {
            expected: 1,
            found: 2,
        };
        assert_eq!(err.to_string(), "ABI version mismatch: expected 1, found 2");

        let err = PluginError::NotLoaded("Demo".into());
        assert_eq!(err.to_string(), "extension not loaded: Demo");

        let err = PluginError::MissingSymbol {
            symbol: "CreateKnowherePluginFactory",
            detail: "undefined symbol".into(),
        };
        assert!(err.to_string().contains("CreateKnowherePluginFactory"));
    }

    #[test]
    fn test_index_error_passthrough() {
        let err: PluginError = IndexError::NotImplemented("metrics".into()).into();
        assert!(err.to_string().contains("metrics"));
    }
}
