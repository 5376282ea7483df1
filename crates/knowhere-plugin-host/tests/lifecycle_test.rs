//! Lifecycle hook observation.
//!
//! Isolated in its own test binary: the demo extension reports hook
//! invocations through a process-global environment variable, and no other
//! test in this binary may load it concurrently.

mod common;

use knowhere_plugin_host::PluginLoader;

#[test]
fn lifecycle_hooks_fire_on_load_and_unload() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("events.log");
    std::env::set_var("DEMO_PLUGIN_EVENT_LOG", &log);

    let loader = PluginLoader::new();
    loader.load(&common::demo_plugin()).unwrap();
    loader.unload("Demo").unwrap();

    std::env::remove_var("DEMO_PLUGIN_EVENT_LOG");

    let events = std::fs::read_to_string(&log).unwrap();
    assert_eq!(events, "on_load\non_unload\n");
}
