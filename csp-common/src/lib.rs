// csp-common/src/lib.rs
pub mod cache;
pub mod config;
pub mod error;
pub mod model;

// Re-export key types
pub use cache::ToolCache;
pub use config::Config;
pub use error::{CspError, Result};
pub use model::{Architecture, ArtifactDescriptor, Family, OsKind, PlatformKey, VersionSpec};
