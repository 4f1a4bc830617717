//! HTTP client for a deployed qrscan instance.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use qrscan_core::{BatchImage, BatchResponse, ScanResult};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ScanClient {
    base_url: String,
    http: reqwest::Client,
}

impl ScanClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("qrscan-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Value> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .with_context(|| format!("Cannot reach {}", self.base_url))?;
        let resp = resp.error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Scan a path on the server's filesystem.
    pub async fn scan_file(&self, image_path: &str) -> Result<ScanResult> {
        let resp = self
            .http
            .get(format!("{}/scan/file", self.base_url))
            .query(&[("image_path", image_path)])
            .send()
            .await?;
        decode(resp).await
    }

    /// Upload a local file as multipart field `file`.
    pub async fn scan_upload(&self, path: &Path) -> Result<ScanResult> {
        let bytes = read_local(path).await?;
        let part = Part::bytes(bytes).file_name(display_name(path));
        let resp = self
            .http
            .post(format!("{}/scan/upload", self.base_url))
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn scan_base64(&self, image_base64: &str) -> Result<ScanResult> {
        let resp = self
            .http
            .post(format!("{}/scan/base64", self.base_url))
            .json(&json!({ "image_base64": image_base64 }))
            .send()
            .await?;
        decode(resp).await
    }

    /// Read a local file and send it base64 encoded.
    pub async fn scan_local_as_base64(&self, path: &Path) -> Result<ScanResult> {
        let bytes = read_local(path).await?;
        self.scan_base64(&STANDARD.encode(bytes)).await
    }

    pub async fn scan_url(&self, url: &str) -> Result<ScanResult> {
        let resp = self
            .http
            .post(format!("{}/scan/url", self.base_url))
            .json(&json!({ "url": url }))
            .send()
            .await?;
        decode(resp).await
    }

    /// Base64-encode each local file and scan them in one request. Entries
    /// are named after the file name.
    pub async fn batch_scan(&self, paths: &[PathBuf]) -> Result<BatchResponse> {
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = read_local(path).await?;
            images.push(BatchImage {
                name: Some(display_name(path)),
                data: Some(STANDARD.encode(bytes)),
            });
        }
        let resp = self
            .http
            .post(format!("{}/scan/batch", self.base_url))
            .json(&json!({ "images": images }))
            .send()
            .await?;
        decode(resp).await
    }
}

// Error responses still carry a full ScanResult, so the body is decoded
// whatever the status.
async fn decode<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    let url = resp.url().clone();
    if !status.is_success() {
        debug!(status = status.as_u16(), url = %url, "Server reported a failure");
    }
    resp.json()
        .await
        .with_context(|| format!("Unexpected response from {url} (HTTP {status})"))
}

async fn read_local(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("File not found: {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrscan_config::{ScanConfig, ServerConfig};
    use qrscan_gateway::{serve, GatewayState};
    use qrscan_scanner::{fixtures, Scanner};
    use std::sync::Arc;
    use tokio::net::TcpListener;

    async fn spawn_gateway() -> ScanClient {
        let scanner = Arc::new(Scanner::new(&ScanConfig::default()).unwrap());
        let state = GatewayState::new(scanner, &ServerConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        ScanClient::new(&format!("http://{addr}/")).unwrap()
    }

    #[tokio::test]
    async fn trims_trailing_slash() {
        let client = ScanClient::new("http://localhost:8000///").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn health_and_scans_against_live_gateway() {
        let client = spawn_gateway().await;
        let health = client.health().await.unwrap();
        assert_eq!(health["status"], "ok");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label-001.png");
        std::fs::write(&path, fixtures::qr_png("LABEL-001")).unwrap();

        let uploaded = client.scan_upload(&path).await.unwrap();
        let encoded = client.scan_local_as_base64(&path).await.unwrap();
        let by_path = client.scan_file(path.to_str().unwrap()).await.unwrap();
        assert!(uploaded.success);
        assert_eq!(uploaded.qr_codes[0].content, "LABEL-001");
        assert_eq!(uploaded, encoded);
        assert_eq!(uploaded, by_path);
    }

    #[tokio::test]
    async fn error_statuses_still_decode_to_results() {
        let client = spawn_gateway().await;
        let missing = client.scan_file("nonexistent/path.jpg").await.unwrap();
        assert!(!missing.success);
        let bad_url = client.scan_url("ftp://example.com/a.png").await.unwrap();
        assert!(!bad_url.success);
    }

    #[tokio::test]
    async fn batch_names_entries_after_files() {
        let client = spawn_gateway().await;
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        std::fs::write(&a, fixtures::qr_png("first")).unwrap();
        std::fs::write(&b, fixtures::blank_png(48, 48)).unwrap();

        let response = client.batch_scan(&[a, b]).await.unwrap();
        assert_eq!(response.total_images, 2);
        assert_eq!(response.results[0].name, "a.png");
        assert_eq!(response.results[0].result.qr_codes[0].content, "first");
        assert_eq!(response.results[1].name, "b.png");
        assert!(!response.results[1].result.qr_found);
    }

    #[tokio::test]
    async fn missing_local_file_is_an_error() {
        let client = ScanClient::new("http://127.0.0.1:9").unwrap();
        let err = client
            .scan_upload(Path::new("nope/missing.png"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
