// csp-common/src/model/mod.rs
pub mod artifact;
pub mod platform;
pub mod version;

// Re-export
pub use artifact::{Architecture, ArtifactDescriptor};
pub use platform::{Family, OsKind, PlatformKey};
pub use version::VersionSpec;
