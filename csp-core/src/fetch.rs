// csp-core/src/fetch.rs
// Cache & Fetch: reuse the tool cache entry for this version, or download
// the artifact and cache it.

use std::path::PathBuf;

use csp_aio::fs::{remove_file_if_exists, set_mode};
use csp_common::config::Config;
use csp_common::error::{CspError, Result};
use csp_common::model::ArtifactDescriptor;
use csp_common::ToolCache;
use tracing::{debug, info, warn};

/// Returns the tool-cache directory holding `descriptor.save_file_name`.
pub async fn fetch_artifact(config: &Config, descriptor: &ArtifactDescriptor) -> Result<PathBuf> {
    let cache = ToolCache::new(&config.tool_cache_dir);
    let version = config.version.as_str();

    if let Some(dir) = cache.find(version, config.architecture) {
        if dir.join(&descriptor.save_file_name).is_file() {
            debug!("Using cached artifact in {}", dir.display());
            return Ok(dir);
        }
        warn!(
            "Cache entry {} lacks {}; downloading again",
            dir.display(),
            descriptor.save_file_name
        );
    }

    info!("Downloading CSP Driver from {}...", descriptor.url);
    let download_path = csp_net::download_tool(
        &descriptor.url,
        &config.temp_dir,
        &descriptor.save_file_name,
    )
    .await?;
    debug!("Downloaded to {}", download_path.display());

    set_mode(&download_path, 0o777)?;

    let cached_dir = cache
        .cache_file(
            &download_path,
            &descriptor.save_file_name,
            version,
            config.architecture,
        )
        .map_err(|e| match e {
            CspError::Cache(_) => e,
            other => CspError::Cache(other.to_string()),
        })?;
    if let Err(e) = remove_file_if_exists(&download_path) {
        warn!("Could not remove temporary download: {}", e);
    }

    debug!("cacheDir: {}", cached_dir.display());
    Ok(cached_dir)
}
