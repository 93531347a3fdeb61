// csp/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use csp_common::error::Result;

pub mod detect;
pub mod install;
pub mod uninstall;

use crate::cli::detect::Detect;
use crate::cli::install::InstallArgs;
use crate::cli::uninstall::Uninstall;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "csp", bin_name = "csp")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install (or reinstall) the CodeSign Protect client and cache it
    Install(InstallArgs),
    /// Print the detected platform
    Detect(Detect),
    /// Remove an existing CodeSign Protect client installation
    Uninstall(Uninstall),
}

impl Command {
    pub async fn run(&self) -> Result<()> {
        match self {
            Self::Install(command) => command.run().await,
            Self::Detect(command) => command.run(),
            Self::Uninstall(command) => command.run(),
        }
    }
}
