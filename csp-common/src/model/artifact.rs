// csp-common/src/model/artifact.rs
use std::fmt;
use std::str::FromStr;

use crate::error::{CspError, Result};
use crate::model::platform::{Family, OsKind, PlatformKey};
use crate::model::version::VersionSpec;

const ARTIFACT_PREFIX: &str = "venafi-csc";

/// Extension given to the generated Windows setup script.
pub const SETUP_SCRIPT_EXTENSION: &str = "bat";

/// CPU architecture of the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    #[default]
    Intel,
    Arm,
}

impl Architecture {
    /// Directory name used by the runner tool cache.
    pub fn tool_cache_name(&self) -> &'static str {
        match self {
            Architecture::Intel => "x64",
            Architecture::Arm => "arm64",
        }
    }
}

impl FromStr for Architecture {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "intel" => Ok(Architecture::Intel),
            "arm" => Ok(Architecture::Arm),
            other => Err(CspError::Config(format!(
                "unknown architecture '{other}' (expected 'intel' or 'arm')"
            ))),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::Intel => f.write_str("intel"),
            Architecture::Arm => f.write_str("arm"),
        }
    }
}

/// Where to download an installer from and what to call it locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub url: String,
    pub save_file_name: String,
    /// Only set on Windows, where install goes through a generated script.
    pub setup_file_name: Option<String>,
}

impl ArtifactDescriptor {
    /// Computes the descriptor for a platform, architecture and version.
    ///
    /// Exactly one naming rule applies per `(os, family, architecture)`;
    /// anything outside the table is [`CspError::UnsupportedPlatform`].
    pub fn locate(
        base_url: &str,
        platform: &PlatformKey,
        architecture: Architecture,
        version: &VersionSpec,
    ) -> Result<Self> {
        let (arch_tag, extension) = artifact_rule(platform, architecture).ok_or_else(|| {
            CspError::UnsupportedPlatform(format!(
                "no installer is published for {platform} on {architecture}"
            ))
        })?;

        let file = format!("{ARTIFACT_PREFIX}-{version}-{arch_tag}.{extension}");
        let url = format!("{}/{}", base_url.trim_end_matches('/'), file);
        let setup_file_name = (platform.os == OsKind::Windows).then(|| {
            let stem = file.strip_suffix(".msi").unwrap_or(&file);
            format!("{stem}.{SETUP_SCRIPT_EXTENSION}")
        });

        Ok(Self {
            url,
            save_file_name: file,
            setup_file_name,
        })
    }
}

fn artifact_rule(
    platform: &PlatformKey,
    architecture: Architecture,
) -> Option<(&'static str, &'static str)> {
    match (platform.os, platform.family, architecture) {
        (OsKind::Linux, Family::Debian, Architecture::Intel) => Some(("x86_64", "deb")),
        (OsKind::Linux, Family::Debian, Architecture::Arm) => Some(("aarch64", "deb")),
        (OsKind::Linux, Family::RedHat, Architecture::Intel) => Some(("x86_64", "rpm")),
        (OsKind::Linux, Family::RedHat, Architecture::Arm) => Some(("aarch64", "rpm")),
        (OsKind::Windows, Family::Default, Architecture::Intel) => Some(("x86_64", "msi")),
        (OsKind::Darwin, Family::Default, Architecture::Intel) => Some(("universal", "dmg")),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://tpp.example.com/csc/clients";

    fn key(os: OsKind, family: Family) -> PlatformKey {
        let distro = match family {
            Family::Debian => "ubuntu",
            Family::RedHat => "rhel",
            Family::Default => "default",
            Family::Unknown => "arch",
        };
        PlatformKey {
            os,
            distro: distro.to_string(),
            family,
        }
    }

    #[test]
    fn supported_table_matches_templates() {
        let version = VersionSpec::parse("24.1.0").unwrap();
        let cases = [
            (OsKind::Linux, Family::Debian, Architecture::Intel, "venafi-csc-24.1.0-x86_64.deb"),
            (OsKind::Linux, Family::Debian, Architecture::Arm, "venafi-csc-24.1.0-aarch64.deb"),
            (OsKind::Linux, Family::RedHat, Architecture::Intel, "venafi-csc-24.1.0-x86_64.rpm"),
            (OsKind::Linux, Family::RedHat, Architecture::Arm, "venafi-csc-24.1.0-aarch64.rpm"),
            (OsKind::Windows, Family::Default, Architecture::Intel, "venafi-csc-24.1.0-x86_64.msi"),
            (OsKind::Darwin, Family::Default, Architecture::Intel, "venafi-csc-24.1.0-universal.dmg"),
        ];
        for (os, family, arch, expected) in cases {
            let d = ArtifactDescriptor::locate(BASE, &key(os, family), arch, &version).unwrap();
            assert_eq!(d.save_file_name, expected);
            assert_eq!(d.url, format!("{BASE}/{expected}"));
        }
    }

    #[test]
    fn unsupported_combinations_fail() {
        let version = VersionSpec::parse("24.1.0").unwrap();
        let cases = [
            (OsKind::Linux, Family::Unknown, Architecture::Intel),
            (OsKind::Linux, Family::Unknown, Architecture::Arm),
            (OsKind::Windows, Family::Default, Architecture::Arm),
            (OsKind::Darwin, Family::Default, Architecture::Arm),
        ];
        for (os, family, arch) in cases {
            let err = ArtifactDescriptor::locate(BASE, &key(os, family), arch, &version).unwrap_err();
            assert!(matches!(err, CspError::UnsupportedPlatform(_)));
        }
    }

    #[test]
    fn windows_gets_a_setup_script_name() {
        let version = VersionSpec::parse("24.1.0").unwrap();
        let d = ArtifactDescriptor::locate(
            BASE,
            &key(OsKind::Windows, Family::Default),
            Architecture::Intel,
            &version,
        )
        .unwrap();
        assert_eq!(d.setup_file_name.as_deref(), Some("venafi-csc-24.1.0-x86_64.bat"));

        let d = ArtifactDescriptor::locate(
            BASE,
            &key(OsKind::Linux, Family::Debian),
            Architecture::Intel,
            &version,
        )
        .unwrap();
        assert!(d.setup_file_name.is_none());
    }

    #[test]
    fn trailing_slash_on_base_url_is_ignored() {
        let version = VersionSpec::parse("24.1.0").unwrap();
        let d = ArtifactDescriptor::locate(
            "https://tpp.example.com/csc/clients/",
            &key(OsKind::Linux, Family::RedHat),
            Architecture::Intel,
            &version,
        )
        .unwrap();
        assert_eq!(d.url, format!("{BASE}/venafi-csc-24.1.0-x86_64.rpm"));
    }

    #[test]
    fn architecture_parses_inputs() {
        assert_eq!("intel".parse::<Architecture>().unwrap(), Architecture::Intel);
        assert_eq!("".parse::<Architecture>().unwrap(), Architecture::Intel);
        assert_eq!("ARM".parse::<Architecture>().unwrap(), Architecture::Arm);
        assert!("sparc".parse::<Architecture>().is_err());
    }
}
