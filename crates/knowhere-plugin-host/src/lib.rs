//! Runtime loading and registration of Knowhere-ABI index extensions.
//!
//! This crate discovers native shared libraries implementing the versioned
//! extension contract from `knowhere-plugin-sdk`, validates compatibility,
//! instantiates per-library factories, and publishes them into an index
//! registry under namespaced aliases.
//!
//! # Architecture
//!
//! ```text
//! directory scan ──> PluginLoader ──> RegistrationBridge ──> IndexRegistry
//!   (discover)       (load/track)      (probe + publish)      (external)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use knowhere_plugin_host::{initialize_plugins, PluginLoader, RegistrationBridge};
//!
//! let loader = Arc::new(PluginLoader::new());
//! let bridge = RegistrationBridge::new(loader, registry);
//!
//! // Explicit directory, or None to probe the conventional locations.
//! initialize_plugins(&bridge, Some(Path::new("/opt/knowhere/plugins")))?;
//!
//! assert!(bridge.is_registered("Demo"));
//! ```
//!
//! # Failure policy
//!
//! A malformed or incompatible library never brings the process down: single
//! loads fail with a descriptive [`PluginError`], batch scans log and skip.
//! The host can still crash if a caller violates the lifetime contract by
//! retaining factory or index references past `unload`; that precondition
//! is documented, not detected.
//!
//! # Concurrency
//!
//! All operations are blocking calls on the caller's thread; the loader and
//! bridge keep their maps behind coarse reader-writer locks, so concurrent
//! calls serialize rather than corrupt state. Index instances obtained
//! through the registry carry their own thread-safety contract (see the SDK).

pub mod bridge;
pub mod discover;
pub mod error;
mod foreign;
pub mod loader;
pub mod registry;

pub use bridge::RegistrationBridge;
pub use discover::{default_plugin_dirs, initialize_plugins, PLUGIN_PATH_ENV};
pub use error::{PluginError, Result};
pub use loader::PluginLoader;
pub use registry::{alias_for, IndexBuilder, IndexFeature, IndexRegistry, ALIAS_PREFIX};
