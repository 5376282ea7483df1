//! Publishes loaded extensions into the external index registry.

use std::collections::{BTreeSet, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use knowhere_plugin_sdk::{ExtensionFeatures, ExtensionInfo, PluginFactory};

use crate::error::{PluginError, Result};
use crate::loader::PluginLoader;
use crate::registry::{alias_for, IndexBuilder, IndexFeature, IndexRegistry};

/// Bridges the loader to the index registry and tracks which aliases this
/// process published.
///
/// The registry stays the source of truth for constructibility; the
/// bookkeeping map here exists for introspection and unregistration
/// accounting only. Construct the bridge explicitly with the loader and
/// registry it should serve; there is no process-wide instance.
pub struct RegistrationBridge {
    loader: Arc<PluginLoader>,
    registry: Arc<dyn IndexRegistry>,
    /// declared name -> published alias
    registered: RwLock<HashMap<String, String>>,
}

impl RegistrationBridge {
    pub fn new(loader: Arc<PluginLoader>, registry: Arc<dyn IndexRegistry>) -> Self {
        Self {
            loader,
            registry,
            registered: RwLock::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &Arc<PluginLoader> {
        &self.loader
    }

    /// Publishes a loaded extension under its namespaced alias.
    ///
    /// Features are reported per index instance, so probing constructs one
    /// throwaway index; that cost is part of registration. Bookkeeping is
    /// only updated after the registry accepts the alias, so a refusal
    /// leaves the bridge untouched.
    pub fn register(&self, name: &str) -> Result<()> {
        let (info, features) = {
            let factory = self
                .loader
                .get_factory(name)
                .ok_or_else(|| PluginError::NotLoaded(name.to_string()))?;
            let info = factory.plugin_info();
            let features = probe_features(name, &*factory)?;
            (info, features)
        };

        let alias = alias_for(&info.name);
        let tags = project_features(&features);

        // The builder captures the loader and name rather than a factory
        // reference: constructing through the alias after an unload fails
        // with NotLoaded instead of dereferencing unmapped code.
        let loader = Arc::clone(&self.loader);
        let plugin_name = info.name.clone();
        let builder: IndexBuilder = Arc::new(move || {
            let factory = loader
                .get_factory(&plugin_name)
                .ok_or_else(|| PluginError::NotLoaded(plugin_name.clone()))?;
            factory.create_index().ok_or_else(|| {
                PluginError::ConstructionFailed(format!(
                    "index constructor returned nothing for {plugin_name}"
                ))
            })
        });

        self.registry.register(&alias, builder, &tags)?;

        self.registered
            .write()
            .insert(name.to_string(), alias.clone());
        info!(name, alias = %alias, "registered extension index");
        Ok(())
    }

    /// Removes the bridge's bookkeeping for `name` and returns the alias
    /// that stays behind: the registry is append-only, so the published
    /// alias itself cannot be retracted.
    pub fn unregister(&self, name: &str) -> Result<String> {
        let alias = self
            .registered
            .write()
            .remove(name)
            .ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        warn!(
            name,
            alias = %alias,
            "alias remains published; the index registry does not support retraction"
        );
        Ok(alias)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.read().contains_key(name)
    }

    pub fn get_alias(&self, name: &str) -> Option<String> {
        self.registered.read().get(name).cloned()
    }

    /// Loads every library in `dir`, then registers each loaded extension.
    ///
    /// Mirrors the loader's best-effort policy: registration failures are
    /// logged, never escalated, so one bad extension cannot block the rest.
    /// Only a structurally invalid directory fails the call.
    pub fn load_and_register(&self, dir: &Path) -> Result<()> {
        self.loader.load_from_directory(dir)?;

        for info in self.loader.list() {
            if self.is_registered(&info.name) {
                continue;
            }
            if let Err(err) = self.register(&info.name) {
                warn!(name = %info.name, %err, "failed to register extension");
            }
        }
        Ok(())
    }

    /// `(alias, descriptor)` for every bridged extension still loaded.
    ///
    /// Extensions unloaded behind the bridge's back simply disappear from
    /// this listing rather than erroring.
    pub fn list_registered(&self) -> Vec<(String, ExtensionInfo)> {
        let registered = self.registered.read();
        registered
            .iter()
            .filter_map(|(name, alias)| {
                let factory = self.loader.get_factory(name)?;
                Some((alias.clone(), factory.plugin_info()))
            })
            .collect()
    }
}

/// Constructs a throwaway index to read the per-instance feature flags.
/// Panics in extension code surface as construction failures.
fn probe_features(name: &str, factory: &dyn PluginFactory) -> Result<ExtensionFeatures> {
    let probed = panic::catch_unwind(AssertUnwindSafe(|| {
        factory.create_index().map(|index| index.features())
    }))
    .map_err(|_| {
        PluginError::ConstructionFailed(format!("feature probe panicked for {name}"))
    })?;
    probed.ok_or_else(|| {
        PluginError::ConstructionFailed(format!("index constructor returned nothing for {name}"))
    })
}

/// Projects declared flags onto the registry's tag vocabulary. GPU, MMAP and
/// DISK are the only flags with tags today; everything else is dropped.
fn project_features(features: &ExtensionFeatures) -> BTreeSet<IndexFeature> {
    let mut tags = BTreeSet::new();
    if features.supports_gpu {
        tags.insert(IndexFeature::Gpu);
    }
    if features.supports_mmap {
        tags.insert(IndexFeature::Mmap);
    }
    if features.supports_disk_storage {
        tags.insert(IndexFeature::Disk);
    }
    tags
}
