//! Shared helpers: fixture cdylib builds and an in-memory index registry
//! standing in for the external one.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::process::Command;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use knowhere_plugin_host::{IndexBuilder, IndexFeature, IndexRegistry, PluginError, Result};
use knowhere_plugin_sdk::PluginIndex;

static FIXTURES: OnceLock<()> = OnceLock::new();

/// Builds every fixture cdylib exactly once per test binary. Cargo's own
/// locking makes concurrent invocations from parallel test binaries safe.
fn build_fixtures() {
    FIXTURES.get_or_init(|| {
        // RUST_LOG=debug surfaces loader activity when a test misbehaves.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        let status = Command::new(env!("CARGO"))
            .args([
                "build",
                "-p",
                "knowhere-demo-plugin",
                "-p",
                "knowhere-stale-plugin",
                "-p",
                "knowhere-hollow-plugin",
            ])
            .current_dir(workspace_root())
            .status()
            .expect("failed to run cargo build for fixtures");
        assert!(status.success(), "fixture build failed");
    });
}

fn workspace_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // workspace root
    dir
}

fn artifact_dir() -> PathBuf {
    std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace_root().join("target"))
        .join("debug")
}

/// Path to a fixture cdylib by its lib stem.
fn fixture(stem: &str) -> PathBuf {
    build_fixtures();
    artifact_dir().join(format!(
        "{}{}{}",
        std::env::consts::DLL_PREFIX,
        stem,
        std::env::consts::DLL_SUFFIX
    ))
}

pub fn demo_plugin() -> PathBuf {
    fixture("knowhere_demo_plugin")
}

pub fn stale_plugin() -> PathBuf {
    fixture("knowhere_stale_plugin")
}

pub fn hollow_plugin() -> PathBuf {
    fixture("knowhere_hollow_plugin")
}

/// Minimal append-only registry mirroring the external service's contract:
/// aliases register once and are never forgotten.
#[derive(Default)]
pub struct InMemoryRegistry {
    entries: Mutex<BTreeMap<String, (IndexBuilder, BTreeSet<IndexFeature>)>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.entries.lock().contains_key(alias)
    }

    pub fn features(&self, alias: &str) -> Option<BTreeSet<IndexFeature>> {
        self.entries.lock().get(alias).map(|(_, tags)| tags.clone())
    }

    /// Constructs an index through a registered builder.
    pub fn construct(&self, alias: &str) -> Option<Result<Box<dyn PluginIndex>>> {
        let builder = self
            .entries
            .lock()
            .get(alias)
            .map(|(builder, _)| Arc::clone(builder))?;
        Some(builder())
    }
}

impl IndexRegistry for InMemoryRegistry {
    fn register(
        &self,
        alias: &str,
        builder: IndexBuilder,
        features: &BTreeSet<IndexFeature>,
    ) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(alias) {
            return Err(PluginError::AliasRejected(alias.to_string()));
        }
        entries.insert(alias.to_string(), (builder, features.clone()));
        Ok(())
    }
}
