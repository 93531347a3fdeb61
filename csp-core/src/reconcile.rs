// csp-core/src/reconcile.rs
//! Orchestrates one run: inspect, uninstall if needed, fetch, install,
//! locate and optionally configure.
//!
//! Steps run strictly in sequence. Inspection and uninstall failures are
//! logged and discarded; everything else aborts the run.

use std::path::PathBuf;

use csp_aio::fs::set_mode;
use csp_aio::ProcessRunner;
use csp_common::config::Config;
use csp_common::error::{CspError, Result};
use csp_common::model::{ArtifactDescriptor, PlatformKey};
use tracing::{debug, info, warn};

use crate::check::{inspect, InstallState};
use crate::configure::{config_tool_name, configure};
use crate::fetch::fetch_artifact;
use crate::install::install;
use crate::locate::find_tool;
use crate::uninstall::uninstall;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    /// Nothing was installed before.
    Installed,
    /// An installation with a different `major.minor` was replaced.
    Reinstalled,
    /// The installed `major.minor` already matched.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub action: RunAction,
    /// The artifact inside the tool cache.
    pub cached_path: PathBuf,
    pub cached_version: String,
    /// `option --show` output when configuration was requested.
    pub config_output: Option<String>,
}

pub struct Reconciler<'a, R: ProcessRunner> {
    config: &'a Config,
    runner: R,
}

impl<'a, R: ProcessRunner> Reconciler<'a, R> {
    pub fn new(config: &'a Config, runner: R) -> Self {
        Self { config, runner }
    }

    /// Current install state, with query failures treated as "not installed".
    pub fn install_state(&self, platform: &PlatformKey) -> InstallState {
        inspect(&self.runner, platform).unwrap_or_else(|e| {
            warn!("Could not determine install state ({}); assuming not installed", e);
            InstallState::not_installed()
        })
    }

    pub async fn run(&self, platform: &PlatformKey) -> Result<RunReport> {
        let config = self.config;
        let version = &config.version;
        info!("Identified '{}' for {}", platform.distro, platform.os);

        // Resolve the artifact first so an unsupported platform fails before
        // anything is removed.
        let descriptor = ArtifactDescriptor::locate(
            &config.base_url(),
            platform,
            config.architecture,
            version,
        )?;
        debug!("Artifact: {:?}", descriptor);

        let state = self.install_state(platform);
        let action = if !state.reinstall_needed(version) {
            info!(
                "CSP Driver {} already installed (matches {}); skipping install",
                state.installed_semver, version
            );
            RunAction::Skipped
        } else if state.is_installed {
            info!(
                "Installed CSP Driver {} differs from requested {}; reinstalling",
                state.installed_semver,
                version.semver()
            );
            if let Err(e) = uninstall(&self.runner, platform, &state.install_id) {
                warn!("Uninstall of '{}' failed: {}", state.install_id, e);
            }
            RunAction::Reinstalled
        } else {
            RunAction::Installed
        };

        let cached_dir = fetch_artifact(config, &descriptor).await?;

        if action != RunAction::Skipped {
            let output = install(
                &self.runner,
                platform,
                &cached_dir,
                &descriptor,
                &config.temp_dir,
            )?;
            debug!("Installation results: {}", output.trim());
        }

        let cached_path = find_tool(&cached_dir, &descriptor.save_file_name)?;
        info!("CSP Driver installed to {}...", cached_path.display());
        set_mode(&cached_path, 0o775)?;

        let config_output = if config.include_config {
            Some(self.apply_config(platform)?)
        } else {
            None
        };

        info!(
            "CSP Driver version: '{}' has been cached at {}",
            version,
            cached_path.display()
        );
        Ok(RunReport {
            action,
            cached_path,
            cached_version: version.to_string(),
            config_output,
        })
    }

    fn apply_config(&self, platform: &PlatformKey) -> Result<String> {
        let config = self.config;
        let (auth_url, hsm_url) = match (config.auth_url.as_deref(), config.hsm_url.as_deref()) {
            (Some(a), Some(h)) => (a, h),
            _ => {
                return Err(CspError::Config(
                    "include-config requires both auth and HSM URLs".to_string(),
                ))
            }
        };
        let root = config.install_root(platform.os);
        let binary = find_tool(&root, config_tool_name(platform.os))?;
        configure(&self.runner, platform, &binary, auth_url, hsm_url)
    }
}
