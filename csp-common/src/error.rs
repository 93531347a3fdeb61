// csp-common/src/error.rs
use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum CspError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("Platform detection failed: {0}")]
    PlatformDetection(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("DownloadError: Failed to download '{0}' from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("Cache Error: {0}")]
    Cache(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Installation command failed: {0}")]
    InstallCommand(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Failed to execute command: {0}")]
    CommandExecError(String),
}

impl From<std::io::Error> for CspError {
    fn from(err: std::io::Error) -> Self {
        CspError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for CspError {
    fn from(err: reqwest::Error) -> Self {
        CspError::Http(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CspError>;
