// csp-aio/src/lib.rs
//! Process execution and filesystem primitives shared by the installer steps.

pub mod fs;
pub mod process;

pub use process::{CommandOutput, CommandSpec, ProcessRunner, SystemRunner};
