// csp-core/src/install/mod.rs
//! Installer: runs the platform installer against the cached artifact.
//!
//! All branches need elevated privileges; the runner must already have
//! them (Linux and Darwin commands go through `sudo`).

pub mod macos;
pub mod windows;

use std::path::Path;

use csp_aio::{CommandOutput, CommandSpec, ProcessRunner};
use csp_common::error::{CspError, Result};
use csp_common::model::{ArtifactDescriptor, Family, OsKind, PlatformKey};
use tracing::{debug, info};

/// Runs `spec` and turns a nonzero exit into [`CspError::InstallCommand`].
pub(crate) fn run_checked<R: ProcessRunner>(runner: &R, spec: &CommandSpec) -> Result<CommandOutput> {
    let output = runner.run(spec)?;
    if output.success() {
        Ok(output)
    } else {
        let detail = if output.stderr.trim().is_empty() {
            output.stdout.trim()
        } else {
            output.stderr.trim()
        };
        Err(CspError::InstallCommand(format!(
            "'{}' exited with {:?}: {}",
            spec, output.status_code, detail
        )))
    }
}

/// Installs `descriptor.save_file_name` from `cached_dir` and returns the
/// installer's stdout.
///
/// `scratch_dir` receives the generated Windows setup script and the
/// Darwin mount point.
pub fn install<R: ProcessRunner>(
    runner: &R,
    platform: &PlatformKey,
    cached_dir: &Path,
    descriptor: &ArtifactDescriptor,
    scratch_dir: &Path,
) -> Result<String> {
    let artifact = cached_dir.join(&descriptor.save_file_name);
    info!("Installing {} on {}", descriptor.save_file_name, platform);

    let output = match (platform.os, platform.family) {
        (OsKind::Linux, Family::Debian) => {
            let spec = CommandSpec::new(
                "dpkg",
                ["-i".to_string(), artifact.display().to_string()],
            )
            .sudo();
            run_checked(runner, &spec)?.stdout
        }
        (OsKind::Linux, Family::RedHat) => {
            let spec = CommandSpec::new(
                "rpm",
                ["-Uvh".to_string(), artifact.display().to_string()],
            )
            .sudo();
            run_checked(runner, &spec)?.stdout
        }
        (OsKind::Windows, _) => {
            let setup_file_name = descriptor.setup_file_name.as_deref().ok_or_else(|| {
                CspError::InstallCommand(format!(
                    "no setup script name for {}",
                    descriptor.save_file_name
                ))
            })?;
            let script = windows::write_setup_script(
                scratch_dir,
                setup_file_name,
                cached_dir,
                &descriptor.save_file_name,
            )?;
            run_checked(runner, &windows::setup_script_command(&script))?.stdout
        }
        (OsKind::Darwin, _) => macos::install_dmg(runner, &artifact, scratch_dir)?,
        _ => {
            return Err(CspError::UnsupportedPlatform(format!(
                "no installer for {platform}"
            )))
        }
    };

    debug!("Installation output: {}", output.trim());
    Ok(output)
}
