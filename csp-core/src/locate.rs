// csp-core/src/locate.rs
//! Tool Locator.
//!
//! Depth-first search for a file by exact name. When several files match,
//! the first one in directory-listing order wins; that order depends on
//! the filesystem and is not specified.

use std::path::{Path, PathBuf};

use csp_common::error::{CspError, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Returns every file under `root` named `file_name`, in traversal order.
pub fn find_all(root: &Path, file_name: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == file_name)
        .map(|entry| entry.into_path())
        .collect()
}

/// Returns the first file under `root` named `file_name`.
pub fn find_tool(root: &Path, file_name: &str) -> Result<PathBuf> {
    info!("Discovery started for {} in {}", file_name, root.display());
    let matches = find_all(root, file_name);
    debug!("Found {} match(es) for {}: {:?}", matches.len(), file_name, matches);

    matches.into_iter().next().ok_or_else(|| {
        CspError::ToolNotFound(format!("{} not found under {}", file_name, root.display()))
    })
}
