// csp-core/src/check/installed.rs
//! Install-State Inspector.
//!
//! Asks the native package manager (or the Windows uninstall registry)
//! whether the client is already present and at which version. Nothing is
//! persisted; the answer is recomputed every run.

use csp_aio::{CommandOutput, CommandSpec, ProcessRunner};
use csp_common::error::Result;
use csp_common::model::version::semver_projection;
use csp_common::model::{Family, OsKind, PlatformKey, VersionSpec};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

/// Native package name on Linux.
pub const PACKAGE_NAME: &str = "venaficodesign";

/// Display-name prefix of the client in the Windows uninstall registry.
pub const WINDOWS_PRODUCT_PATTERN: &str = "Venafi CodeSign Protect*";

lazy_static! {
    static ref PRODUCT_GUID_RE: Regex = Regex::new(
        r"\{[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\}"
    )
    .unwrap();
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallState {
    pub is_installed: bool,
    /// `major.minor` of the installed version, empty when not installed.
    pub installed_semver: String,
    /// Package name (Linux), product GUID or display name (Windows).
    pub install_id: String,
}

impl InstallState {
    pub fn not_installed() -> Self {
        Self::default()
    }

    /// Reinstall unless the installed `major.minor` equals the requested one.
    pub fn reinstall_needed(&self, requested: &VersionSpec) -> bool {
        !(self.is_installed && requested.matches_installed(&self.installed_semver))
    }
}

/// The command that lists an existing installation, if the platform has one.
pub fn query_command(platform: &PlatformKey) -> Option<CommandSpec> {
    match (platform.os, platform.family) {
        (OsKind::Linux, Family::Debian) => {
            Some(CommandSpec::new("apt", ["show", PACKAGE_NAME]).sudo())
        }
        (OsKind::Linux, Family::RedHat) => {
            Some(CommandSpec::new("yum", ["info", PACKAGE_NAME]).sudo())
        }
        (OsKind::Windows, _) => Some(CommandSpec::new(
            "powershell",
            [
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                windows_registry_query(),
            ],
        )),
        _ => None,
    }
}

fn windows_registry_query() -> String {
    format!(
        "Get-ItemProperty \
         'HKLM:\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*',\
         'HKLM:\\Software\\WOW6432Node\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\*' \
         -ErrorAction SilentlyContinue | \
         Where-Object {{ $_.DisplayName -like '{WINDOWS_PRODUCT_PATTERN}' }} | \
         Format-List DisplayName,DisplayVersion,PSChildName"
    )
}

/// Queries the host for an existing installation.
///
/// A nonzero exit from the query means "not installed". Darwin has no
/// query and always reports not installed.
pub fn inspect<R: ProcessRunner>(runner: &R, platform: &PlatformKey) -> Result<InstallState> {
    let Some(spec) = query_command(platform) else {
        debug!("No install-state query for {}; assuming not installed", platform);
        return Ok(InstallState::not_installed());
    };

    let output = runner.run(&spec)?;
    if !output.success() {
        debug!(
            "'{}' exited with {:?}; client not installed",
            spec, output.status_code
        );
        return Ok(InstallState::not_installed());
    }

    let state = match platform.os {
        OsKind::Windows => parse_windows_listing(&output),
        _ => parse_package_info(&output, PACKAGE_NAME),
    };
    debug!("Install state for {}: {:?}", platform, state);
    Ok(state)
}

/// Parses `key: value` package-manager output (apt show, yum info).
pub fn parse_package_info(output: &CommandOutput, package: &str) -> InstallState {
    match field_value(&output.stdout, "version") {
        Some(version) => InstallState {
            is_installed: true,
            installed_semver: project_installed(&version),
            install_id: package.to_string(),
        },
        None => {
            warn!("Package query succeeded but reported no version for {package}");
            InstallState::not_installed()
        }
    }
}

/// Parses the `Format-List` output of the uninstall-registry listing.
pub fn parse_windows_listing(output: &CommandOutput) -> InstallState {
    let Some(version) = field_value(&output.stdout, "DisplayVersion") else {
        return InstallState::not_installed();
    };
    let install_id = PRODUCT_GUID_RE
        .find(&output.stdout)
        .map(|m| m.as_str().to_string())
        .or_else(|| field_value(&output.stdout, "DisplayName"))
        .unwrap_or_default();

    InstallState {
        is_installed: true,
        installed_semver: project_installed(&version),
        install_id,
    }
}

/// Case-insensitive lookup of the first `key: value` line.
fn field_value(text: &str, key: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Debian versions may carry an epoch ("1:24.1.0-1").
fn project_installed(version: &str) -> String {
    let without_epoch = version.split_once(':').map_or(version, |(_, rest)| rest);
    semver_projection(without_epoch).unwrap_or_else(|e| {
        warn!("Installed version '{}' is not dotted ({}); forcing reinstall", version, e);
        without_epoch.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingRunner;

    fn platform(os: OsKind, family: Family) -> PlatformKey {
        PlatformKey {
            os,
            distro: "x".to_string(),
            family,
        }
    }

    const APT_SHOW: &str = "Package: venaficodesign\nVersion: 24.1.0\nPriority: optional\nSection: utils\nMaintainer: Venafi\n";

    const YUM_INFO: &str = "Installed Packages\nName         : venaficodesign\nVersion      : 23.1.2\nRelease      : 1\nArchitecture : x86_64\n";

    const REG_LISTING: &str = "\r\n\r\nDisplayName    : Venafi CodeSign Protect Clients\r\nDisplayVersion : 24.1.0.1302\r\nPSChildName    : {6E2B3F4A-1C2D-4E5F-8A9B-0C1D2E3F4A5B}\r\n\r\n";

    #[test]
    fn debian_query_parses_version() {
        let runner = RecordingRunner::new().respond("apt show", 0, APT_SHOW);
        let state = inspect(&runner, &platform(OsKind::Linux, Family::Debian)).unwrap();
        assert!(state.is_installed);
        assert_eq!(state.installed_semver, "24.1");
        assert_eq!(state.install_id, PACKAGE_NAME);
        assert_eq!(runner.lines(), vec!["sudo apt show venaficodesign"]);
    }

    #[test]
    fn redhat_query_parses_padded_keys() {
        let runner = RecordingRunner::new().respond("yum info", 0, YUM_INFO);
        let state = inspect(&runner, &platform(OsKind::Linux, Family::RedHat)).unwrap();
        assert_eq!(state.installed_semver, "23.1");
        assert_eq!(runner.lines(), vec!["sudo yum info venaficodesign"]);
    }

    #[test]
    fn nonzero_exit_means_not_installed() {
        let runner = RecordingRunner::new().respond("apt show", 100, "");
        let state = inspect(&runner, &platform(OsKind::Linux, Family::Debian)).unwrap();
        assert_eq!(state, InstallState::not_installed());
    }

    #[test]
    fn darwin_never_queries() {
        let runner = RecordingRunner::new();
        let state = inspect(&runner, &platform(OsKind::Darwin, Family::Default)).unwrap();
        assert!(!state.is_installed);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn windows_listing_extracts_guid_and_version() {
        let runner = RecordingRunner::new().respond("powershell", 0, REG_LISTING);
        let state = inspect(&runner, &platform(OsKind::Windows, Family::Default)).unwrap();
        assert!(state.is_installed);
        assert_eq!(state.installed_semver, "24.1");
        assert_eq!(state.install_id, "{6E2B3F4A-1C2D-4E5F-8A9B-0C1D2E3F4A5B}");
        let call = &runner.calls()[0];
        assert!(call.args.last().unwrap().contains("Venafi CodeSign Protect*"));
    }

    #[test]
    fn windows_listing_without_guid_uses_display_name() {
        let output = CommandOutput {
            status_code: Some(0),
            stdout: "DisplayName    : Venafi CodeSign Protect\nDisplayVersion : 23.1.0\n".to_string(),
            stderr: String::new(),
        };
        let state = parse_windows_listing(&output);
        assert_eq!(state.install_id, "Venafi CodeSign Protect");
    }

    #[test]
    fn empty_windows_listing_is_not_installed() {
        let output = CommandOutput {
            status_code: Some(0),
            ..CommandOutput::default()
        };
        assert!(!parse_windows_listing(&output).is_installed);
    }

    #[test]
    fn key_match_is_case_insensitive() {
        let output = CommandOutput {
            status_code: Some(0),
            stdout: "VERSION: 24.2.1\n".to_string(),
            stderr: String::new(),
        };
        assert_eq!(parse_package_info(&output, PACKAGE_NAME).installed_semver, "24.2");
    }

    #[test]
    fn epoch_is_dropped_before_projection() {
        assert_eq!(project_installed("1:24.1.0-3"), "24.1");
    }

    #[test]
    fn reinstall_decision() {
        let installed = InstallState {
            is_installed: true,
            installed_semver: "24.1".to_string(),
            install_id: PACKAGE_NAME.to_string(),
        };
        assert!(!installed.reinstall_needed(&VersionSpec::parse("24.1.7").unwrap()));

        let older = InstallState {
            installed_semver: "23.1".to_string(),
            ..installed
        };
        assert!(older.reinstall_needed(&VersionSpec::parse("24.1.0").unwrap()));

        assert!(InstallState::not_installed().reinstall_needed(&VersionSpec::parse("24.1.0").unwrap()));
    }

    #[test]
    fn spawn_failure_propagates() {
        let runner = RecordingRunner::new().fail_to_spawn("yum");
        assert!(inspect(&runner, &platform(OsKind::Linux, Family::RedHat)).is_err());
    }
}
