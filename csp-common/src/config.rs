// csp-common/src/config.rs
use std::env;
use std::path::PathBuf;

use directories::BaseDirs;
use tracing::debug;

use crate::error::{CspError, Result};
use crate::model::{Architecture, OsKind, VersionSpec};

/// Path segment appended to the CSC endpoint to reach the client downloads.
const CLIENTS_PATH: &str = "clients";

const LINUX_INSTALL_ROOT: &str = "/opt/venafi/codesign";
const DARWIN_INSTALL_ROOT: &str = "/Library/Venafi/CodeSigning";
const WINDOWS_INSTALL_ROOT: &str = r"C:\Program Files\Venafi CodeSign Protect";

/// Everything a run needs, resolved once up front and passed by reference
/// to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub version: VersionSpec,
    pub architecture: Architecture,
    /// The TPP code-sign-client endpoint, without the `/clients` suffix.
    pub csc_url: String,
    pub auth_url: Option<String>,
    pub hsm_url: Option<String>,
    pub include_config: bool,
    pub tool_cache_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub install_root: Option<PathBuf>,
}

impl Config {
    /// A config with runner-derived directories and no configuration step.
    pub fn new(version: VersionSpec, csc_url: impl Into<String>) -> Self {
        Self {
            version,
            architecture: Architecture::default(),
            csc_url: csc_url.into(),
            auth_url: None,
            hsm_url: None,
            include_config: false,
            tool_cache_dir: default_tool_cache_dir(),
            temp_dir: default_temp_dir(),
            install_root: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.csc_url.trim().is_empty() {
            return Err(CspError::Config(
                "the CSC endpoint URL is required".to_string(),
            ));
        }
        if self.include_config {
            let missing: Vec<&str> = [("auth URL", &self.auth_url), ("HSM URL", &self.hsm_url)]
                .into_iter()
                .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
                .map(|(name, _)| name)
                .collect();
            if !missing.is_empty() {
                return Err(CspError::Config(format!(
                    "include-config requires: {}",
                    missing.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Base URL the installer artifacts are published under.
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.csc_url.trim_end_matches('/'), CLIENTS_PATH)
    }

    /// Directory the vendor installer places its binaries under.
    pub fn install_root(&self, os: OsKind) -> PathBuf {
        self.install_root
            .clone()
            .unwrap_or_else(|| default_install_root(os))
    }
}

pub fn default_install_root(os: OsKind) -> PathBuf {
    match os {
        OsKind::Linux => PathBuf::from(LINUX_INSTALL_ROOT),
        OsKind::Darwin => PathBuf::from(DARWIN_INSTALL_ROOT),
        OsKind::Windows => PathBuf::from(WINDOWS_INSTALL_ROOT),
    }
}

/// `RUNNER_TOOL_CACHE`, falling back to a per-user cache directory.
pub fn default_tool_cache_dir() -> PathBuf {
    if let Some(dir) = env::var_os("RUNNER_TOOL_CACHE").filter(|s| !s.is_empty()) {
        return PathBuf::from(dir);
    }
    let fallback = BaseDirs::new()
        .map(|dirs| dirs.cache_dir().join("csp").join("tool-cache"))
        .unwrap_or_else(|| env::temp_dir().join("csp-tool-cache"));
    debug!(
        "RUNNER_TOOL_CACHE not set, using {}",
        fallback.display()
    );
    fallback
}

/// `RUNNER_TEMP`, falling back to the system temp directory.
pub fn default_temp_dir() -> PathBuf {
    env::var_os("RUNNER_TEMP")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            VersionSpec::parse("24.1.0").unwrap(),
            "https://tpp.example.com/csc",
        )
    }

    #[test]
    fn base_url_appends_clients() {
        assert_eq!(config().base_url(), "https://tpp.example.com/csc/clients");

        let mut cfg = config();
        cfg.csc_url = "https://tpp.example.com/csc/".to_string();
        assert_eq!(cfg.base_url(), "https://tpp.example.com/csc/clients");
    }

    #[test]
    fn include_config_requires_both_urls() {
        let mut cfg = config();
        cfg.include_config = true;
        cfg.auth_url = Some("https://tpp.example.com/vedauth".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("HSM URL"));

        cfg.hsm_url = Some("https://tpp.example.com/vedhsm".to_string());
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_endpoint_is_rejected() {
        let mut cfg = config();
        cfg.csc_url = " ".to_string();
        assert!(matches!(cfg.validate().unwrap_err(), CspError::Config(_)));
    }

    #[test]
    fn install_root_override_wins() {
        let mut cfg = config();
        assert_eq!(
            cfg.install_root(OsKind::Linux),
            PathBuf::from("/opt/venafi/codesign")
        );
        cfg.install_root = Some(PathBuf::from("/tmp/root"));
        assert_eq!(cfg.install_root(OsKind::Windows), PathBuf::from("/tmp/root"));
    }
}
