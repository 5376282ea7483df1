//! Runtime loading and tracking of extension libraries.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use libloading::Library;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::{debug, info, warn};

use knowhere_plugin_sdk::abi::{
    ApiVersionFn, CreateFactoryFn, DestroyFactoryFn, LifecycleFn, PLUGIN_API_VERSION,
    SYM_API_VERSION, SYM_CREATE_FACTORY, SYM_DESTROY_FACTORY, SYM_LIFECYCLE,
};
use knowhere_plugin_sdk::{ExtensionInfo, PluginFactory};

use crate::error::{PluginError, Result};
use crate::foreign::{ForeignFactory, ForeignLifecycle};

/// One loaded extension library.
///
/// Field order is load-bearing: the factory and lifecycle handles are
/// declared before the library handle so they drop first, keeping extension
/// destructors inside mapped code.
struct LoadedExtension {
    info: ExtensionInfo,
    factory: ForeignFactory,
    lifecycle: Option<ForeignLifecycle>,
    _library: Library,
}

#[derive(Default)]
struct LoaderState {
    /// Primary ownership, keyed by library path.
    by_path: HashMap<PathBuf, LoadedExtension>,
    /// Secondary index; every value resolves to a live `by_path` entry.
    by_name: HashMap<String, PathBuf>,
}

/// Loads extension libraries and tracks them by path and declared name.
///
/// Construct one explicitly and share it (`Arc`) with whoever drives plugin
/// initialization; there is no process-wide instance. A single lock guards
/// both internal maps, so cross-map updates stay atomic and concurrent
/// load/unload calls serialize on it.
pub struct PluginLoader {
    state: RwLock<LoaderState>,
}

impl PluginLoader {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LoaderState::default()),
        }
    }

    /// Loads every shared library in `dir`.
    ///
    /// Returns the number of extensions loaded. Fails only when `dir` itself
    /// is not a readable directory; individual load failures are logged and
    /// skipped, and files without the platform's native-library suffix are
    /// ignored.
    pub fn load_from_directory(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(PluginError::InvalidArgument(format!(
                "extension directory does not exist: {}",
                dir.display()
            )));
        }

        info!(dir = %dir.display(), "loading extensions");
        let entries = std::fs::read_dir(dir).map_err(|e| {
            PluginError::InvalidArgument(format!("cannot read {}: {e}", dir.display()))
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !is_native_library(&path) {
                continue;
            }
            match self.load(&path) {
                Ok(()) => loaded += 1,
                Err(err) => warn!(path = %path.display(), %err, "skipping extension"),
            }
        }
        info!(dir = %dir.display(), count = loaded, "extension scan finished");
        Ok(loaded)
    }

    /// Loads a single extension library.
    ///
    /// Runs the full negotiation sequence: open, version gate, factory
    /// symbols, factory construction, descriptor read, optional lifecycle
    /// hook. Every failure path releases the library handle before
    /// returning, and a failed load leaves both maps exactly as they were.
    pub fn load(&self, path: &Path) -> Result<()> {
        // Cheap duplicate check up front; re-checked under the write lock
        // before insertion.
        if self.state.read().by_path.contains_key(path) {
            return Err(PluginError::AlreadyLoaded(path.to_path_buf()));
        }

        debug!(path = %path.display(), "opening extension library");
        // libloading opens with RTLD_LAZY | RTLD_LOCAL on unix: symbols
        // resolve on demand and stay private to the library.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::OpenFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let loaded = Self::negotiate(path, library)?;
        let info = loaded.info.clone();

        let mut state = self.state.write();
        if state.by_path.contains_key(path) {
            return Err(PluginError::AlreadyLoaded(path.to_path_buf()));
        }
        if let Some(existing) = state.by_name.get(&info.name).cloned() {
            // Dropping `loaded` rolls the whole load back: factory released,
            // handle closed, nothing retained.
            return Err(PluginError::DuplicateName {
                name: info.name,
                existing,
            });
        }
        state.by_name.insert(info.name.clone(), path.to_path_buf());
        state.by_path.insert(path.to_path_buf(), loaded);
        drop(state);

        info!(
            name = %info.name,
            version = %info.version,
            path = %path.display(),
            "loaded extension"
        );
        Ok(())
    }

    /// Runs ABI negotiation against an opened library. Consumes the handle;
    /// on failure it is dropped (closed) before the error propagates.
    fn negotiate(path: &Path, library: Library) -> Result<LoadedExtension> {
        let version = unsafe {
            let get_version = library
                .get::<ApiVersionFn>(SYM_API_VERSION.as_bytes())
                .map_err(|e| PluginError::MissingSymbol {
                    symbol: SYM_API_VERSION,
                    detail: e.to_string(),
                })?;
            get_version()
        };
        if version != PLUGIN_API_VERSION {
            return Err(PluginError::IncompatibleAbi {
                expected: PLUGIN_API_VERSION,
                found: version,
            });
        }

        // A constructor without its matching destructor is rejected
        // outright: deallocation must stay on the extension side.
        let (create, destroy): (CreateFactoryFn, DestroyFactoryFn) = unsafe {
            let create = library
                .get::<CreateFactoryFn>(SYM_CREATE_FACTORY.as_bytes())
                .map_err(|e| PluginError::MissingSymbol {
                    symbol: SYM_CREATE_FACTORY,
                    detail: e.to_string(),
                })?;
            let destroy = library
                .get::<DestroyFactoryFn>(SYM_DESTROY_FACTORY.as_bytes())
                .map_err(|e| PluginError::MissingSymbol {
                    symbol: SYM_DESTROY_FACTORY,
                    detail: e.to_string(),
                })?;
            (*create, *destroy)
        };

        let raw_factory = unsafe { create() };
        if raw_factory.is_null() {
            return Err(PluginError::ConstructionFailed(format!(
                "factory constructor returned null for {}",
                path.display()
            )));
        }
        let factory = unsafe { ForeignFactory::from_raw(raw_factory, destroy) };

        // First call into extension code proper; a panic is contained here
        // and reported as a construction failure.
        let info = panic::catch_unwind(AssertUnwindSafe(|| factory.get().plugin_info()))
            .map_err(|_| {
                PluginError::ConstructionFailed(format!(
                    "descriptor read panicked for {}",
                    path.display()
                ))
            })?;

        let lifecycle = unsafe {
            library
                .get::<LifecycleFn>(SYM_LIFECYCLE.as_bytes())
                .ok()
                .and_then(|accessor| {
                    let ptr = accessor();
                    (!ptr.is_null()).then(|| ForeignLifecycle::from_raw(ptr))
                })
        };

        if let Some(handler) = &lifecycle {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.get().on_load())) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(path = %path.display(), %err, "on_load reported failure"),
                Err(_) => warn!(path = %path.display(), "on_load panicked"),
            }
        }

        Ok(LoadedExtension {
            info,
            factory,
            lifecycle,
            _library: library,
        })
    }

    /// Unloads the named extension, invoking `on_unload` best-effort first.
    ///
    /// Raw references previously obtained from this extension's factory are
    /// dangling afterwards; callers must not retain them past this call.
    pub fn unload(&self, name: &str) -> Result<()> {
        let entry = {
            let mut state = self.state.write();
            let path = state
                .by_name
                .remove(name)
                .ok_or_else(|| PluginError::NotLoaded(name.to_string()))?;
            state
                .by_path
                .remove(&path)
                .ok_or_else(|| PluginError::NotLoaded(name.to_string()))?
        };

        Self::run_unload_hook(name, &entry);
        drop(entry);
        info!(name, "unloaded extension");
        Ok(())
    }

    fn run_unload_hook(name: &str, entry: &LoadedExtension) {
        if let Some(handler) = &entry.lifecycle {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.get().on_unload())) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(name, %err, "on_unload reported failure"),
                Err(_) => warn!(name, "on_unload panicked"),
            }
        }
    }

    /// Non-owning factory lookup; the returned guard borrows the registry
    /// and blocks unload for as long as it is held.
    pub fn get_factory(&self, name: &str) -> Option<MappedRwLockReadGuard<'_, dyn PluginFactory>> {
        let state = self.state.read();
        RwLockReadGuard::try_map(state, |s| {
            s.by_name
                .get(name)
                .and_then(|path| s.by_path.get(path))
                .map(|entry| entry.factory.get())
        })
        .ok()
    }

    /// Descriptor snapshot of every loaded extension, in map order.
    pub fn list(&self) -> Vec<ExtensionInfo> {
        self.state
            .read()
            .by_path
            .values()
            .map(|entry| entry.info.clone())
            .collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.state.read().by_name.contains_key(name)
    }

    /// Number of loaded extensions.
    pub fn count(&self) -> usize {
        self.state.read().by_path.len()
    }

    /// Unloads everything. Also runs when the loader is dropped, so no
    /// native handle outlives the loader itself.
    pub fn unload_all(&self) {
        let entries: Vec<(PathBuf, LoadedExtension)> = {
            let mut state = self.state.write();
            state.by_name.clear();
            state.by_path.drain().collect()
        };
        for (path, entry) in entries {
            Self::run_unload_hook(&entry.info.name, &entry);
            debug!(path = %path.display(), "closed extension library");
            drop(entry);
        }
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PluginLoader {
    fn drop(&mut self) {
        self.unload_all();
    }
}

/// Matches the platform's native shared-library suffix.
fn is_native_library(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(std::env::consts::DLL_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_missing_directory() {
        let loader = PluginLoader::new();
        let err = loader
            .load_from_directory(Path::new("/nonexistent/extension/dir"))
            .unwrap_err();
        assert!(matches!(err, PluginError::InvalidArgument(_)));
    }

    #[test]
    fn test_open_failure_carries_loader_diagnostic() {
        let loader = PluginLoader::new();
        let err = loader.load(Path::new("/nonexistent/libdemo.so")).unwrap_err();
        match err {
            PluginError::OpenFailed { detail, .. } => assert!(!detail.is_empty()),
            other => panic!("expected OpenFailed, got {other}"),
        }
    }

    #[test]
    fn test_unload_unknown_name() {
        let loader = PluginLoader::new();
        assert!(matches!(
            loader.unload("nowhere"),
            Err(PluginError::NotLoaded(_))
        ));
    }

    #[test]
    fn test_lookups_on_empty_loader() {
        let loader = PluginLoader::new();
        assert!(loader.get_factory("Demo").is_none());
        assert!(!loader.is_loaded("Demo"));
        assert!(loader.list().is_empty());
        assert_eq!(loader.count(), 0);
    }

    #[test]
    fn test_is_native_library() {
        let suffix = std::env::consts::DLL_EXTENSION;
        assert!(is_native_library(Path::new(&format!("libdemo.{suffix}"))));
        assert!(!is_native_library(Path::new("readme.txt")));
        assert!(!is_native_library(Path::new("no_extension")));
    }
}
