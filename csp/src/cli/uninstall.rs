// csp/src/cli/uninstall.rs
use clap::Args;
use colored::Colorize;
use csp_aio::SystemRunner;
use csp_common::error::Result;
use csp_common::model::PlatformKey;
use csp_core::check::inspect;
use csp_core::uninstall::uninstall;
use tracing::debug;

#[derive(Args, Debug)]
pub struct Uninstall;

impl Uninstall {
    pub fn run(&self) -> Result<()> {
        let platform = PlatformKey::detect()?;
        let runner = SystemRunner;

        let state = inspect(&runner, &platform)?;
        debug!("Install state: {:?}", state);
        if !state.is_installed {
            println!("No CodeSign Protect client installation found on {platform}");
            return Ok(());
        }

        println!("Uninstalling {}...", state.install_id);
        uninstall(&runner, &platform, &state.install_id)?;
        println!(
            "✓ Uninstalled {} {}",
            state.install_id.green(),
            state.installed_semver
        );
        Ok(())
    }
}
