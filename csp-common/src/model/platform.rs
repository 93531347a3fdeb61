// csp-common/src/model/platform.rs
//! Normalised host platform key.
//!
//! Every downstream decision (artifact naming, inspect/uninstall/install
//! commands, tool lookup) dispatches on a [`PlatformKey`] computed once
//! per run.

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{CspError, Result};

/// Release-info files consulted on Linux, in order.
pub const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

const DEBIAN_LIKE: &[&str] = &["ubuntu", "debian"];
const REDHAT_LIKE: &[&str] = &["rhel", "centos", "rocky", "amzn", "fedora", "ol"];

/// Distro value used for every non-Linux host.
pub const DEFAULT_DISTRO: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsKind {
    Linux,
    Windows,
    Darwin,
}

impl OsKind {
    /// Accepts both the Node-style `os.type()` names and Rust's
    /// `std::env::consts::OS` values.
    pub fn from_raw(raw: &str) -> Result<Self> {
        match raw.trim() {
            "Linux" | "linux" => Ok(OsKind::Linux),
            "Windows_NT" | "Windows" | "windows" => Ok(OsKind::Windows),
            "Darwin" | "darwin" | "macos" => Ok(OsKind::Darwin),
            other => Err(CspError::PlatformDetection(format!(
                "unrecognised operating system '{other}'"
            ))),
        }
    }

    /// The operating system this binary was compiled for.
    pub fn host() -> Result<Self> {
        Self::from_raw(std::env::consts::OS)
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OsKind::Linux => "Linux",
            OsKind::Windows => "Windows",
            OsKind::Darwin => "Darwin",
        };
        f.write_str(s)
    }
}

/// Package-manager grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Debian,
    RedHat,
    /// Non-Linux hosts, which have a single packaging scheme each.
    Default,
    Unknown,
}

impl Family {
    pub fn from_distro(distro: &str) -> Self {
        if DEBIAN_LIKE.contains(&distro) {
            Family::Debian
        } else if REDHAT_LIKE.contains(&distro) {
            Family::RedHat
        } else {
            Family::Unknown
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Family::Debian => "debian",
            Family::RedHat => "redhat",
            Family::Default => "default",
            Family::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: OsKind,
    pub distro: String,
    pub family: Family,
}

impl PlatformKey {
    /// Classifies a raw OS name plus, for Linux, the contents of an
    /// os-release style file.
    pub fn classify(raw_os_name: &str, linux_release: Option<&str>) -> Result<Self> {
        let os = OsKind::from_raw(raw_os_name)?;
        if os != OsKind::Linux {
            return Ok(Self {
                os,
                distro: DEFAULT_DISTRO.to_string(),
                family: Family::Default,
            });
        }

        let release = linux_release.ok_or_else(|| {
            CspError::PlatformDetection("Linux release information is unavailable".to_string())
        })?;
        let distro = release_field(release, "ID")
            .map(|id| id.to_ascii_lowercase())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                CspError::PlatformDetection("release information has no ID field".to_string())
            })?;
        let family = Family::from_distro(&distro);
        debug!("Classified Linux distro '{}' as family {}", distro, family);

        Ok(Self {
            os,
            distro,
            family,
        })
    }

    /// Classifies the current host, reading the first readable os-release
    /// file on Linux.
    pub fn detect() -> Result<Self> {
        let os = OsKind::host()?;
        if os != OsKind::Linux {
            return Self::classify(&os.to_string(), None);
        }
        let release = read_os_release(OS_RELEASE_PATHS.iter().map(Path::new))?;
        Self::classify(&os.to_string(), Some(&release))
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.os, self.distro, self.family)
    }
}

/// Extracts `key` from `KEY=VALUE` lines, stripping one pair of
/// surrounding quotes from the value.
pub fn release_field(release: &str, key: &str) -> Option<String> {
    release
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| unquote(v.trim()).to_string())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn read_os_release<'a>(candidates: impl Iterator<Item = &'a Path>) -> Result<String> {
    let mut tried = Vec::new();
    for path in candidates {
        match fs::read_to_string(path) {
            Ok(contents) => {
                debug!("Read release information from {}", path.display());
                return Ok(contents);
            }
            Err(e) => {
                debug!("Could not read {}: {}", path.display(), e);
                tried.push(format!("{}: {e}", path.display()));
            }
        }
    }
    Err(CspError::PlatformDetection(format!(
        "no readable os-release file ({})",
        tried.join("; ")
    )))
}
