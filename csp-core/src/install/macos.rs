// csp-core/src/install/macos.rs
use std::fs;
use std::path::{Path, PathBuf};

use csp_aio::{CommandSpec, ProcessRunner};
use csp_common::error::{CspError, Result};
use tracing::{debug, warn};

use super::run_checked;

/// Package bundle shipped inside the client disk image.
pub const PKG_NAME: &str = "Venafi CodeSign Protect Clients.pkg";

/// Mount point directory created under the scratch directory.
pub const MOUNT_DIR_NAME: &str = "csp-installer";

/// An attached disk image. Dropping the guard detaches it if
/// [`MountGuard::detach`] was not reached.
pub struct MountGuard<'a, R: ProcessRunner> {
    runner: &'a R,
    mount_point: PathBuf,
    attached: bool,
}

impl<'a, R: ProcessRunner> MountGuard<'a, R> {
    pub fn attach(runner: &'a R, dmg: &Path, mount_point: &Path) -> Result<Self> {
        fs::create_dir_all(mount_point)?;
        let spec = CommandSpec::new(
            "hdiutil",
            [
                "attach".to_string(),
                dmg.display().to_string(),
                "-noautoopen".to_string(),
                "-mountpoint".to_string(),
                mount_point.display().to_string(),
            ],
        )
        .sudo();
        run_checked(runner, &spec)?;
        debug!("Attached {} at {}", dmg.display(), mount_point.display());
        Ok(Self {
            runner,
            mount_point: mount_point.to_path_buf(),
            attached: true,
        })
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }

    /// Detaches now and reports the result.
    pub fn detach(mut self) -> Result<()> {
        self.attached = false;
        run_detach(self.runner, &self.mount_point)
    }
}

impl<R: ProcessRunner> Drop for MountGuard<'_, R> {
    fn drop(&mut self) {
        if self.attached {
            if let Err(e) = run_detach(self.runner, &self.mount_point) {
                warn!(
                    "Failed to detach {} during cleanup: {}",
                    self.mount_point.display(),
                    e
                );
            }
        }
    }
}

fn detach_command(mount_point: &Path) -> CommandSpec {
    CommandSpec::new(
        "hdiutil",
        ["detach".to_string(), mount_point.display().to_string()],
    )
    .sudo()
}

fn run_detach<R: ProcessRunner>(runner: &R, mount_point: &Path) -> Result<()> {
    run_checked(runner, &detach_command(mount_point)).map(|_| {
        debug!("Detached {}", mount_point.display());
    })
}

/// Mounts the disk image, installs the contained package and unmounts.
/// The unmount is attempted on every exit path once the attach succeeded.
pub fn install_dmg<R: ProcessRunner>(runner: &R, dmg: &Path, scratch_dir: &Path) -> Result<String> {
    let mount_point = scratch_dir.join(MOUNT_DIR_NAME);
    let guard = MountGuard::attach(runner, dmg, &mount_point)?;

    let pkg = guard.mount_point().join(PKG_NAME);
    let spec = CommandSpec::new(
        "installer",
        [
            "-pkg".to_string(),
            pkg.display().to_string(),
            "-target".to_string(),
            "/".to_string(),
        ],
    )
    .sudo();
    let output = run_checked(runner, &spec)?;

    guard.detach().map_err(|e| {
        CspError::InstallCommand(format!("package installed but detach failed: {e}"))
    })?;
    Ok(output.stdout)
}
