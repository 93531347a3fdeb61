// csp-common/src/model/version.rs
use std::fmt;

use crate::error::{CspError, Result};

/// A requested dotted version string such as `24.1.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionSpec {
    raw: String,
    semver: String,
}

impl VersionSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(CspError::Version("version must not be empty".to_string()));
        }
        let semver = semver_projection(raw)?;
        Ok(Self {
            raw: raw.to_string(),
            semver,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The `major.minor` projection used for reinstall decisions.
    pub fn semver(&self) -> &str {
        &self.semver
    }

    /// True when `installed_semver` names the same `major.minor` line.
    /// Patch-level drift is deliberately ignored.
    pub fn matches_installed(&self, installed_semver: &str) -> bool {
        self.semver == installed_semver
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Truncates a dotted version to its first two components.
///
/// `"24.1.5"` becomes `"24.1"`. Fewer than two non-empty components is an
/// error rather than a partial result.
pub fn semver_projection(version: &str) -> Result<String> {
    let mut parts = version.trim().split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) if !major.is_empty() && !minor.is_empty() => {
            Ok(format!("{major}.{minor}"))
        }
        _ => Err(CspError::Version(format!(
            "'{version}' does not have major.minor components"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_truncates() {
        assert_eq!(semver_projection("24.1.5").unwrap(), "24.1");
        assert_eq!(semver_projection("24.1").unwrap(), "24.1");
        assert_eq!(semver_projection("24.1.0.1234").unwrap(), "24.1");
        assert_eq!(semver_projection("23.1.0-1").unwrap(), "23.1");
    }

    #[test]
    fn projection_rejects_short_versions() {
        for bad in ["24", "", "24.", ".1", "latest"] {
            let err = semver_projection(bad).unwrap_err();
            assert!(matches!(err, CspError::Version(_)), "{bad} should fail");
        }
    }

    #[test]
    fn matches_installed_ignores_patch() {
        let requested = VersionSpec::parse("24.1.7").unwrap();
        assert!(requested.matches_installed("24.1"));

        let requested = VersionSpec::parse("24.1.0").unwrap();
        assert!(!requested.matches_installed("23.1"));
    }

    #[test]
    fn parse_trims_and_keeps_raw() {
        let v = VersionSpec::parse(" 24.1.0 ").unwrap();
        assert_eq!(v.as_str(), "24.1.0");
        assert_eq!(v.semver(), "24.1");
        assert_eq!(v.to_string(), "24.1.0");
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(matches!(
            VersionSpec::parse("  ").unwrap_err(),
            CspError::Version(_)
        ));
    }
}
