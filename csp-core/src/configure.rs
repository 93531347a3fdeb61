// csp-core/src/configure.rs
use std::path::Path;

use csp_aio::{CommandSpec, ProcessRunner};
use csp_common::error::Result;
use csp_common::model::{OsKind, PlatformKey};
use tracing::{debug, info};

use crate::install::run_checked;

/// Name of the client's configuration binary.
pub fn config_tool_name(os: OsKind) -> &'static str {
    match os {
        OsKind::Windows => "cspconfig.exe",
        OsKind::Linux | OsKind::Darwin => "pkcs11config",
    }
}

/// Points the installed client at the TPP authentication and HSM
/// endpoints, then returns the `option --show` listing.
///
/// Every platform currently takes the same two commands.
pub fn configure<R: ProcessRunner>(
    runner: &R,
    platform: &PlatformKey,
    binary: &Path,
    auth_url: &str,
    hsm_url: &str,
) -> Result<String> {
    let program = binary.display().to_string();
    info!("Configuring {} on {}", program, platform);

    let set_url = CommandSpec::new(
        program.clone(),
        [
            "seturl".to_string(),
            format!("--authurl={auth_url}"),
            format!("--hsmurl={hsm_url}"),
        ],
    );
    run_checked(runner, &set_url)?;

    let show = CommandSpec::new(program, ["option", "--show"]);
    let output = run_checked(runner, &show)?;
    debug!("Configuration: {}", output.stdout.trim());
    Ok(output.stdout)
}
