// csp-aio/src/fs.rs
// Small filesystem helpers used around downloads and installed binaries.

use std::fs;
use std::io;
use std::path::Path;

use csp_common::error::{CspError, Result};
use tracing::{debug, warn};

/// Sets unix permission bits on `path`. No-op on other platforms.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        debug!("Setting mode {:o} on {}", mode, path.display());
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(CspError::from)
    }
    #[cfg(not(unix))]
    {
        debug!(
            "Skipping mode {:o} on {} (not a unix platform)",
            mode,
            path.display()
        );
        Ok(())
    }
}

/// Removes a file, treating "already gone" as success.
pub fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            Err(CspError::from(e))
        }
    }
}
