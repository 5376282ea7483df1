//! SDK for building Knowhere-ABI index extensions.
//!
//! An extension is an independently built shared library (`.so`/`.dylib`/
//! `.dll`) that provides vector index implementations to a host process. The
//! library implements [`PluginFactory`] and [`PluginIndex`] and exports the
//! contract entry points with [`declare_plugin!`]:
//!
//! ```rust,ignore
//! use knowhere_plugin_sdk::prelude::*;
//!
//! #[derive(Default)]
//! struct MyFactory;
//!
//! impl PluginFactory for MyFactory {
//!     fn create_index(&self) -> Option<Box<dyn PluginIndex>> {
//!         Some(Box::new(MyIndex::default()))
//!     }
//!     fn create_config(&self) -> Option<Box<dyn PluginConfig>> {
//!         Some(Box::new(MyConfig))
//!     }
//!     fn plugin_info(&self) -> ExtensionInfo {
//!         ExtensionInfo::new("MyIndex", "1.0.0")
//!     }
//! }
//!
//! declare_plugin!(MyFactory);
//! ```
//!
//! The host negotiates compatibility through the integer version in
//! [`abi::PLUGIN_API_VERSION`]; a mismatch is a hard load failure. See the
//! [`abi`] module for the exact symbol surface and its ownership rules.

pub mod abi;
pub mod data;
pub mod error;
#[macro_use]
pub mod macros;
pub mod factory;
pub mod index;
pub mod types;

pub use data::{BinarySet, Bitset, Dataset};
pub use error::{IndexError, IndexResult};
pub use factory::{PluginConfig, PluginFactory, PluginLifecycle};
pub use index::{AnnIterator, PluginIndex};
pub use types::{ExtensionFeatures, ExtensionInfo, HealthStatus};

/// Re-exports commonly used by extension crates.
pub mod prelude {
    pub use crate::abi::PLUGIN_API_VERSION;
    pub use crate::data::{BinarySet, Bitset, Dataset};
    pub use crate::error::{IndexError, IndexResult};
    pub use crate::factory::{PluginConfig, PluginFactory, PluginLifecycle};
    pub use crate::index::{AnnIterator, PluginIndex};
    pub use crate::types::{ExtensionFeatures, ExtensionInfo, HealthStatus};
    pub use serde_json::Value;

    pub use crate::declare_plugin;
}
