//! Bridge and end-to-end registration tests.

mod common;

use std::sync::Arc;

use common::InMemoryRegistry;
use knowhere_plugin_host::{
    alias_for, IndexFeature, PluginError, PluginLoader, RegistrationBridge,
};
use knowhere_plugin_sdk::{Bitset, Dataset};

fn demo_bridge() -> (Arc<InMemoryRegistry>, RegistrationBridge) {
    let registry = Arc::new(InMemoryRegistry::new());
    let loader = Arc::new(PluginLoader::new());
    let bridge = RegistrationBridge::new(loader, registry.clone());
    (registry, bridge)
}

#[test]
fn register_publishes_under_namespaced_alias() {
    let (registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();

    bridge.register("Demo").unwrap();

    assert!(bridge.is_registered("Demo"));
    assert_eq!(bridge.get_alias("Demo").as_deref(), Some("PLUGIN_Demo"));
    assert_eq!(alias_for("Demo"), "PLUGIN_Demo");
    assert!(registry.contains("PLUGIN_Demo"));
}

#[test]
fn feature_probe_projects_declared_flags() {
    let (registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();
    bridge.register("Demo").unwrap();

    // Demo declares mmap support but neither GPU nor disk residency.
    let tags = registry.features("PLUGIN_Demo").unwrap();
    assert!(tags.contains(&IndexFeature::Mmap));
    assert!(!tags.contains(&IndexFeature::Gpu));
    assert!(!tags.contains(&IndexFeature::Disk));
}

#[test]
fn constructing_through_the_registry_yields_a_working_index() {
    let (registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();
    bridge.register("Demo").unwrap();

    let mut index = registry.construct("PLUGIN_Demo").unwrap().unwrap();
    let data = Dataset::from_vectors(2, 2, vec![0.0, 0.0, 5.0, 5.0]);
    index
        .build(&data, &serde_json::json!({"metric_type": "L2"}))
        .unwrap();

    let queries = Dataset::from_vectors(1, 2, vec![4.5, 4.5]);
    let results = index
        .search(&queries, &serde_json::json!({"k": 1}), &Bitset::empty())
        .unwrap();
    assert_eq!(results.ids()[0], 1);
}

#[test]
fn register_unknown_name_fails_without_bookkeeping() {
    let (registry, bridge) = demo_bridge();
    let err = bridge.register("Demo").unwrap_err();
    assert!(matches!(err, PluginError::NotLoaded(_)));
    assert!(!bridge.is_registered("Demo"));
    assert!(!registry.contains("PLUGIN_Demo"));
}

#[test]
fn alias_rejection_leaves_bridge_state_clean() {
    let (_registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();

    bridge.register("Demo").unwrap();
    // The registry is append-only, so a second registration collides.
    let err = bridge.register("Demo").unwrap_err();
    assert!(matches!(err, PluginError::AliasRejected(_)));

    // First registration is untouched.
    assert!(bridge.is_registered("Demo"));
}

#[test]
fn unregister_surfaces_the_orphaned_alias() {
    let (registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();
    bridge.register("Demo").unwrap();

    let alias = bridge.unregister("Demo").unwrap();
    assert_eq!(alias, "PLUGIN_Demo");
    assert!(!bridge.is_registered("Demo"));
    // The alias stays constructible: unregistration is bookkeeping only.
    assert!(registry.contains("PLUGIN_Demo"));

    assert!(matches!(
        bridge.unregister("Demo"),
        Err(PluginError::NotRegistered(_))
    ));
}

#[test]
fn out_of_band_unload_hides_entry_from_listing() {
    let (_registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();
    bridge.register("Demo").unwrap();

    let listed = bridge.list_registered();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].0, "PLUGIN_Demo");
    assert_eq!(listed[0].1.name, "Demo");

    // Unload directly through the loader, bypassing the bridge.
    bridge.loader().unload("Demo").unwrap();
    assert!(bridge.is_registered("Demo"));
    assert!(bridge.list_registered().is_empty());
}

#[test]
fn builder_fails_closed_after_unload() {
    let (registry, bridge) = demo_bridge();
    bridge.loader().load(&common::demo_plugin()).unwrap();
    bridge.register("Demo").unwrap();
    bridge.loader().unload("Demo").unwrap();

    // `Box<dyn PluginIndex>` isn't `Debug`, so extract the error by match
    // rather than `unwrap_err` (which would need `Debug` on the Ok value).
    let err = match registry.construct("PLUGIN_Demo").unwrap() {
        Ok(_) => panic!("expected construction to fail after unload"),
        Err(err) => err,
    };
    assert!(matches!(err, PluginError::NotLoaded(_)));
}

#[test]
fn load_and_register_is_best_effort_per_plugin() {
    let dir = tempfile::tempdir().unwrap();
    let suffix = std::env::consts::DLL_SUFFIX;
    std::fs::copy(common::demo_plugin(), dir.path().join(format!("libdemo{suffix}"))).unwrap();
    std::fs::copy(common::stale_plugin(), dir.path().join(format!("libstale{suffix}"))).unwrap();

    let (registry, bridge) = demo_bridge();
    bridge.load_and_register(dir.path()).unwrap();

    assert!(bridge.is_registered("Demo"));
    assert!(registry.contains("PLUGIN_Demo"));
    assert_eq!(bridge.loader().count(), 1);
}

#[test]
fn load_and_register_rejects_missing_directory() {
    let (_registry, bridge) = demo_bridge();
    let err = bridge
        .load_and_register(std::path::Path::new("/nonexistent/plugins"))
        .unwrap_err();
    assert!(matches!(err, PluginError::InvalidArgument(_)));
}
