// csp-core/src/install/windows.rs
// The MSI is installed through a generated one-line batch script rather
// than by invoking msiexec directly.

use std::fs;
use std::path::{Path, PathBuf};

use csp_aio::CommandSpec;
use csp_common::error::{CspError, Result};
use tracing::debug;

const MSI_INSTALLER: &str = "msiexec";

/// `msiexec /qn /i "<cached_dir>\<msi_file>"`, without a line terminator.
pub fn render_setup_script(cached_dir: &Path, msi_file: &str) -> String {
    let dir = cached_dir.display().to_string();
    let dir = dir.trim_end_matches(['\\', '/']);
    format!("{MSI_INSTALLER} /qn /i \"{dir}\\{msi_file}\"")
}

/// Writes the setup script into `scratch_dir` and returns its path.
///
/// A relative `cached_dir` is resolved against the current directory so
/// the script always names the MSI by absolute path.
pub fn write_setup_script(
    scratch_dir: &Path,
    setup_file_name: &str,
    cached_dir: &Path,
    msi_file: &str,
) -> Result<PathBuf> {
    fs::create_dir_all(scratch_dir)?;
    let script_path = scratch_dir.join(setup_file_name);
    let cached_dir = std::path::absolute(cached_dir)?;
    let content = render_setup_script(&cached_dir, msi_file);
    debug!("Writing setup script {}: {}", script_path.display(), content);
    fs::write(&script_path, format!("{content}\r\n")).map_err(|e| {
        CspError::InstallCommand(format!(
            "cannot write setup script {}: {e}",
            script_path.display()
        ))
    })?;
    Ok(script_path)
}

/// Runs the generated script through `cmd`.
pub fn setup_script_command(script_path: &Path) -> CommandSpec {
    CommandSpec::new(
        "cmd",
        ["/C".to_string(), script_path.display().to_string()],
    )
}
