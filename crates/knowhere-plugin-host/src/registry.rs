//! Seam to the process-wide index registry.
//!
//! The registry itself is an external collaborator; this module defines only
//! the surface the bridge publishes through. The registry is append-only for
//! this integration: once an alias is accepted there is no retraction path.

use std::collections::BTreeSet;
use std::sync::Arc;

use knowhere_plugin_sdk::PluginIndex;

use crate::error::Result;

/// Prefix namespacing every plugin-provided index name in the registry.
pub const ALIAS_PREFIX: &str = "PLUGIN_";

/// Capability tags understood by the index registry.
///
/// Only these three project from `ExtensionFeatures`; the remaining declared
/// flags (range search, iterator, metric and element-type lists) have no tag
/// vocabulary yet and are dropped during projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexFeature {
    Gpu,
    Mmap,
    Disk,
}

/// Constructor published under an alias; every call produces a fresh index.
pub type IndexBuilder = Arc<dyn Fn() -> Result<Box<dyn PluginIndex>> + Send + Sync>;

/// Registration surface of the external index registry.
///
/// Whether an alias collides with a built-in index name is the registry's
/// concern; the bridge only guarantees it keeps its own bookkeeping
/// untouched when registration is refused.
pub trait IndexRegistry: Send + Sync {
    /// Publishes `builder` under `alias` with the given capability tags.
    fn register(
        &self,
        alias: &str,
        builder: IndexBuilder,
        features: &BTreeSet<IndexFeature>,
    ) -> Result<()>;
}

/// Builds the public alias for a declared extension name.
pub fn alias_for(name: &str) -> String {
    format!("{ALIAS_PREFIX}{name}")
}
