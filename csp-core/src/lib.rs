// csp-core/src/lib.rs

pub mod check;
pub mod configure;
pub mod fetch;
pub mod install;
pub mod locate;
pub mod reconcile;
pub mod uninstall;

#[cfg(test)]
pub(crate) mod testing;

pub use check::{inspect, InstallState};
pub use reconcile::{Reconciler, RunReport, RunAction};
