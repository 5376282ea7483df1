//! Conventional discovery locations and the one-call initialization helper.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::bridge::RegistrationBridge;
use crate::error::Result;

/// Environment variable holding extra extension directories, separated like
/// `PATH`, searched ahead of the conventional locations.
pub const PLUGIN_PATH_ENV: &str = "KNOWHERE_PLUGIN_PATH";

/// Candidate install locations in search order.
///
/// Entries from [`PLUGIN_PATH_ENV`] come first, then the system-wide paths,
/// a process-relative `./plugins`, and a user-home path. The home entry is
/// omitted entirely when no home directory resolves. Absent directories are
/// fine; callers skip the ones that do not exist.
pub fn default_plugin_dirs() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(raw) = std::env::var(PLUGIN_PATH_ENV) {
        candidates.extend(std::env::split_paths(&raw));
    }
    candidates.push(PathBuf::from("/usr/local/lib/knowhere/plugins"));
    candidates.push(PathBuf::from("/usr/lib/knowhere/plugins"));
    candidates.push(PathBuf::from("./plugins"));
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".knowhere").join("plugins"));
    }
    candidates
}

/// Loads and registers extensions from `dir` when given, otherwise from
/// every conventional location that exists.
///
/// With an explicit directory the scan's own result is surfaced. Without
/// one, each existing candidate is scanned best-effort and the number of
/// directories scanned is returned; individual plugin failures never
/// propagate out of a scan either way.
pub fn initialize_plugins(bridge: &RegistrationBridge, dir: Option<&Path>) -> Result<usize> {
    if let Some(dir) = dir {
        bridge.load_and_register(dir)?;
        return Ok(1);
    }

    let mut scanned = 0;
    for candidate in default_plugin_dirs() {
        if !candidate.is_dir() {
            debug!(dir = %candidate.display(), "skipping absent extension directory");
            continue;
        }
        info!(dir = %candidate.display(), "scanning extension directory");
        match bridge.load_and_register(&candidate) {
            Ok(()) => scanned += 1,
            Err(err) => warn!(dir = %candidate.display(), %err, "directory scan failed"),
        }
    }
    Ok(scanned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dirs_contain_conventional_locations() {
        let candidates = default_plugin_dirs();
        assert!(candidates.contains(&PathBuf::from("/usr/local/lib/knowhere/plugins")));
        assert!(candidates.contains(&PathBuf::from("/usr/lib/knowhere/plugins")));
        assert!(candidates.contains(&PathBuf::from("./plugins")));
    }

    #[test]
    fn test_env_paths_come_first() {
        // Env access is process-global; this test owns the variable briefly.
        std::env::set_var(PLUGIN_PATH_ENV, "/tmp/kh-a:/tmp/kh-b");
        let candidates = default_plugin_dirs();
        std::env::remove_var(PLUGIN_PATH_ENV);

        assert_eq!(candidates[0], PathBuf::from("/tmp/kh-a"));
        assert_eq!(candidates[1], PathBuf::from("/tmp/kh-b"));
    }
}
