// csp/src/cli/install.rs
use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};
use colored::Colorize;
use csp_aio::SystemRunner;
use csp_common::config::Config;
use csp_common::error::Result;
use csp_common::model::{Architecture, PlatformKey, VersionSpec};
use csp_core::{Reconciler, RunAction, RunReport};
use tracing::{debug, info};

use crate::actions;

pub const OUTPUT_CACHED_CONFIG: &str = "csp-driver-cached-config";
pub const OUTPUT_CACHED_PATH: &str = "csp-driver-cached-path";
pub const OUTPUT_CACHED_VERSION: &str = "csp-driver-cached-version";

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Client version to install, e.g. 24.1.0
    #[arg(long = "tpp-version", env = "INPUT_TPP-VERSION")]
    pub tpp_version: String,

    /// Runner CPU architecture: intel or arm
    #[arg(
        long,
        env = "INPUT_ARCHITECTURE",
        default_value = "intel",
        value_parser = parse_architecture
    )]
    pub architecture: Architecture,

    /// TPP code-sign-client endpoint; installers are fetched from <URL>/clients
    #[arg(long = "tpp-csc-url", env = "INPUT_TPP-CSC-URL")]
    pub csc_url: String,

    /// TPP authentication endpoint, used with --include-config
    #[arg(long = "tpp-auth-url", env = "INPUT_TPP-AUTH-URL")]
    pub auth_url: Option<String>,

    /// TPP HSM endpoint, used with --include-config
    #[arg(long = "tpp-hsm-url", env = "INPUT_TPP-HSM-URL")]
    pub hsm_url: Option<String>,

    /// Point the installed client at the TPP endpoints after installing
    #[arg(
        long = "include-config",
        env = "INPUT_INCLUDE-CONFIG",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub include_config: bool,

    /// Tool cache root (defaults to RUNNER_TOOL_CACHE)
    #[arg(long, value_name = "DIR")]
    pub tool_cache_dir: Option<PathBuf>,

    /// Scratch directory for downloads (defaults to RUNNER_TEMP)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Directory the client installs into, searched for the config tool
    #[arg(long, value_name = "DIR")]
    pub install_root: Option<PathBuf>,
}

fn parse_architecture(raw: &str) -> std::result::Result<Architecture, String> {
    raw.parse().map_err(|e: csp_common::CspError| e.to_string())
}

impl InstallArgs {
    pub fn to_config(&self) -> Result<Config> {
        let mut config = Config::new(VersionSpec::parse(&self.tpp_version)?, self.csc_url.trim());
        config.architecture = self.architecture;
        config.auth_url = non_empty(self.auth_url.as_deref());
        config.hsm_url = non_empty(self.hsm_url.as_deref());
        config.include_config = self.include_config;
        if let Some(dir) = &self.tool_cache_dir {
            config.tool_cache_dir = dir.clone();
        }
        if let Some(dir) = &self.temp_dir {
            config.temp_dir = dir.clone();
        }
        config.install_root = self.install_root.clone();
        config.validate()?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.to_config()?;
        debug!("Resolved config: {:?}", config);

        let platform = PlatformKey::detect()?;
        let report = Reconciler::new(&config, SystemRunner).run(&platform).await?;
        publish(&report)?;

        let verb = match report.action {
            RunAction::Installed => "Installed",
            RunAction::Reinstalled => "Reinstalled",
            RunAction::Skipped => "Already installed",
        };
        println!(
            "✓ {} CSP Driver {} ({})",
            verb,
            report.cached_version.green(),
            report.cached_path.display()
        );
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn publish(report: &RunReport) -> Result<()> {
    if let Some(dir) = report.cached_path.parent() {
        let path_var = std::env::var("PATH").unwrap_or_default();
        if actions::needs_path_entry(&path_var, dir) {
            info!("Adding {} to PATH", dir.display());
            actions::add_path(dir)?;
        }
    }
    if let Some(output) = &report.config_output {
        actions::set_output(OUTPUT_CACHED_CONFIG, output)?;
    }
    actions::set_output(
        OUTPUT_CACHED_PATH,
        &report.cached_path.display().to_string(),
    )?;
    actions::set_output(OUTPUT_CACHED_VERSION, &report.cached_version)?;
    Ok(())
}
