// csp-common/src/cache.rs
// Runner tool cache: <root>/<tool>/<version>/<arch>/ plus an <arch>.complete marker.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CspError, Result};
use crate::model::Architecture;

/// Name the client is cached under.
pub const TOOL_NAME: &str = "Venafi_CSP";

const COMPLETE_SUFFIX: &str = "complete";

#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(TOOL_NAME).join(version)
    }

    fn entry_dir(&self, version: &str, arch: Architecture) -> PathBuf {
        self.version_dir(version).join(arch.tool_cache_name())
    }

    fn marker_path(&self, version: &str, arch: Architecture) -> PathBuf {
        self.version_dir(version)
            .join(format!("{}.{COMPLETE_SUFFIX}", arch.tool_cache_name()))
    }

    /// Returns the cached directory for `version`, if a complete entry exists.
    pub fn find(&self, version: &str, arch: Architecture) -> Option<PathBuf> {
        let dir = self.entry_dir(version, arch);
        let marker = self.marker_path(version, arch);
        if dir.is_dir() && marker.is_file() {
            debug!("Tool cache hit: {}", dir.display());
            Some(dir)
        } else {
            debug!("Tool cache miss for {} {} ({})", TOOL_NAME, version, arch);
            None
        }
    }

    /// Copies `source` into the cache as `target_file` and marks the entry
    /// complete. Returns the cached directory.
    pub fn cache_file(
        &self,
        source: &Path,
        target_file: &str,
        version: &str,
        arch: Architecture,
    ) -> Result<PathBuf> {
        if !source.is_file() {
            return Err(CspError::Cache(format!(
                "source file {} does not exist",
                source.display()
            )));
        }

        let dir = self.entry_dir(version, arch);
        let marker = self.marker_path(version, arch);
        // A stale marker would make a half-written entry look complete.
        if marker.exists() {
            fs::remove_file(&marker).map_err(|e| cache_err("remove marker", &marker, e))?;
        }
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| cache_err("clear", &dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| cache_err("create", &dir, e))?;

        let dest = dir.join(target_file);
        debug!("Caching {} as {}", source.display(), dest.display());
        fs::copy(source, &dest).map_err(|e| cache_err("copy into", &dest, e))?;
        fs::write(&marker, b"").map_err(|e| cache_err("write marker", &marker, e))?;

        Ok(dir)
    }
}

fn cache_err(action: &str, path: &Path, e: std::io::Error) -> CspError {
    CspError::Cache(format!("failed to {action} {}: {e}", path.display()))
}
