// csp-core/src/check/mod.rs
pub mod installed;

pub use installed::{inspect, InstallState};
