// csp-net/src/http.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use csp_common::error::{CspError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tokio::fs::File as TokioFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::validation::validate_url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = "csp installer (Rust)";

/// Downloads `url` into `dest_dir/file_name` and returns the final path.
///
/// The body is written to a hidden temporary sibling first and renamed
/// into place only once the whole response has been written. No retries.
pub async fn download_tool(url: &str, dest_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let parsed = validate_url(url)?;
    fs::create_dir_all(dest_dir).map_err(|e| {
        CspError::DownloadError(
            file_name.to_string(),
            url.to_string(),
            format!("cannot create {}: {e}", dest_dir.display()),
        )
    })?;

    let client = build_http_client()?;
    let final_path = dest_dir.join(file_name);
    download_to(&client, parsed, &final_path, file_name).await
}

fn build_http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(CspError::from)
}

async fn download_to(
    client: &Client,
    url: url::Url,
    final_path: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let url_str = url.to_string();
    let download_err = |reason: String| {
        CspError::DownloadError(file_name.to_string(), url_str.clone(), reason)
    };

    let temp_path = final_path.with_file_name(format!(".{file_name}.download"));
    debug!("Downloading to temporary path: {}", temp_path.display());

    let response = client.get(url.clone()).send().await.map_err(|e| {
        debug!("HTTP request failed for {url}: {e}");
        download_err(format!("HTTP request failed: {e}"))
    })?;
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);

    if !status.is_success() {
        error!("HTTP error {} for URL {}", status, url);
        let reason = match status {
            StatusCode::NOT_FOUND => "Resource not found (404)".to_string(),
            StatusCode::FORBIDDEN => "Access forbidden (403)".to_string(),
            StatusCode::UNAUTHORIZED => "Authentication required (401)".to_string(),
            other => format!("HTTP status {other}"),
        };
        return Err(download_err(reason));
    }

    let content = response
        .bytes()
        .await
        .map_err(|e| download_err(format!("Failed to read response body: {e}")))?;

    let mut temp_file = TokioFile::create(&temp_path)
        .await
        .map_err(|e| download_err(format!("cannot create {}: {e}", temp_path.display())))?;
    if let Err(e) = temp_file.write_all(&content).await {
        let _ = fs::remove_file(&temp_path);
        return Err(download_err(format!(
            "cannot write {}: {e}",
            temp_path.display()
        )));
    }
    temp_file
        .flush()
        .await
        .map_err(|e| download_err(format!("cannot flush {}: {e}", temp_path.display())))?;
    drop(temp_file);

    fs::rename(&temp_path, final_path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        download_err(format!(
            "cannot move {} to {}: {e}",
            temp_path.display(),
            final_path.display()
        ))
    })?;
    debug!(
        "Downloaded {} bytes to {}",
        content.len(),
        final_path.display()
    );
    Ok(final_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serves a single canned HTTP response and returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn downloads_into_destination() {
        let base = serve_once("200 OK", b"installer-bytes").await;
        let dir = tempfile::tempdir().unwrap();
        let path = download_tool(&format!("{base}/clients/a.deb"), dir.path(), "a.deb")
            .await
            .unwrap();
        assert_eq!(path, dir.path().join("a.deb"));
        assert_eq!(fs::read(&path).unwrap(), b"installer-bytes");
        assert!(!dir.path().join(".a.deb.download").exists());
    }

    #[tokio::test]
    async fn not_found_is_a_download_error() {
        let base = serve_once("404 Not Found", b"").await;
        let dir = tempfile::tempdir().unwrap();
        let url = format!("{base}/clients/missing.deb");
        let err = download_tool(&url, dir.path(), "missing.deb")
            .await
            .unwrap_err();
        match err {
            CspError::DownloadError(file, attempted, reason) => {
                assert_eq!(file, "missing.deb");
                assert_eq!(attempted, url);
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dir.path().join("missing.deb").exists());
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_request() {
        let dir = tempfile::tempdir().unwrap();
        let err = download_tool("ftp://example.com/a.deb", dir.path(), "a.deb")
            .await
            .unwrap_err();
        assert!(matches!(err, CspError::ValidationError(_)));
    }
}
