// csp/src/cli/detect.rs
use clap::Args;
use colored::Colorize;
use csp_common::error::Result;
use csp_common::model::PlatformKey;

#[derive(Args, Debug)]
pub struct Detect;

impl Detect {
    pub fn run(&self) -> Result<()> {
        let platform = PlatformKey::detect()?;
        println!("{} {}", "Platform:".bold(), platform);
        Ok(())
    }
}
