// csp-core/src/uninstall.rs
//! Removal of a previously detected installation.
//!
//! Removal is best-effort: callers decide whether an `Err` matters. The
//! reconciler logs it and carries on, since a fresh runner usually has
//! nothing to remove.

use csp_aio::{CommandSpec, ProcessRunner};
use csp_common::error::{CspError, Result};
use csp_common::model::{Family, OsKind, PlatformKey};
use tracing::{debug, info};

/// The removal command for `install_id` on `platform`, if removal is
/// supported there.
pub fn uninstall_command(platform: &PlatformKey, install_id: &str) -> Option<CommandSpec> {
    match (platform.os, platform.family) {
        (OsKind::Linux, Family::Debian) => {
            Some(CommandSpec::new("apt-get", ["remove", "-y", install_id]).sudo())
        }
        (OsKind::Linux, Family::RedHat) => {
            Some(CommandSpec::new("yum", ["remove", "-y", install_id]).sudo())
        }
        (OsKind::Windows, _) if is_product_code(install_id) => {
            Some(CommandSpec::new("msiexec", ["/qn", "/x", install_id]))
        }
        (OsKind::Windows, _) => Some(CommandSpec::new(
            "powershell",
            [
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                format!(
                    "Get-Package -Name '{}' | Uninstall-Package -Force",
                    install_id.replace('\'', "''")
                ),
            ],
        )),
        _ => None,
    }
}

fn is_product_code(install_id: &str) -> bool {
    install_id.starts_with('{') && install_id.ends_with('}')
}

/// Removes the installation identified by `install_id`.
///
/// Darwin and unknown families are a no-op. A nonzero exit is returned as
/// [`CspError::InstallCommand`].
pub fn uninstall<R: ProcessRunner>(
    runner: &R,
    platform: &PlatformKey,
    install_id: &str,
) -> Result<()> {
    if install_id.is_empty() {
        debug!("No install id; nothing to uninstall");
        return Ok(());
    }
    let Some(spec) = uninstall_command(platform, install_id) else {
        debug!("Uninstall is not supported on {}; skipping", platform);
        return Ok(());
    };

    info!("Removing existing installation '{}'", install_id);
    let output = runner.run(&spec)?;
    if output.success() {
        debug!("Removed '{}'", install_id);
        Ok(())
    } else {
        Err(CspError::InstallCommand(format!(
            "'{}' exited with {:?}: {}",
            spec,
            output.status_code,
            output.stderr.trim()
        )))
    }
}
