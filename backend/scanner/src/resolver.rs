//! Input Resolver: path, upload, base64 or URL in, raw image bytes out.

use std::path::Path;
use std::time::Duration;

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};
use qrscan_core::{ImageSource, ScanError};
use qrscan_logging::redact_url;
use reqwest::{redirect, Client};
use tracing::{debug, warn};
use url::Url;

/// Standard alphabet; padding optional, since agents routinely strip it.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const MAX_REDIRECTS: usize = 10;

/// Turns any `ImageSource` into bytes. Cheap to clone (the HTTP client is
/// reference counted).
#[derive(Clone)]
pub struct InputResolver {
    client: Client,
    fetch_timeout: Duration,
}

impl InputResolver {
    pub fn new(fetch_timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(fetch_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(concat!("qrscan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            fetch_timeout,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub async fn resolve(&self, source: ImageSource) -> Result<Vec<u8>, ScanError> {
        match source {
            ImageSource::Path(path) => resolve_from_path(&path).await,
            ImageSource::Upload(bytes) => resolve_from_upload(bytes),
            ImageSource::Base64(text) => resolve_from_base64(&text),
            ImageSource::Url(url) => self.resolve_from_url(&url).await,
        }
    }

    /// Single GET, no retries. Redirects are followed; the whole exchange
    /// (connect, headers, body) is bounded by the fetch timeout.
    pub async fn resolve_from_url(&self, raw: &str) -> Result<Vec<u8>, ScanError> {
        let url = validate_url(raw)?;
        let shown = redact_url(url.as_str());
        debug!(url = %shown, timeout = ?self.fetch_timeout, "Fetching image");

        let resp = self.client.get(url).send().await.map_err(classify_fetch_error)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(url = %shown, status = status.as_u16(), "Upstream returned an error status");
            return Err(ScanError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(classify_fetch_error)?;
        debug!(url = %shown, bytes = body.len(), "Fetched image");
        Ok(body.to_vec())
    }
}

pub async fn resolve_from_path(path: &Path) -> Result<Vec<u8>, ScanError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Cannot read image file");
            Err(ScanError::NotFound(path.display().to_string()))
        }
    }
}

pub fn resolve_from_upload(bytes: Vec<u8>) -> Result<Vec<u8>, ScanError> {
    if bytes.is_empty() {
        return Err(ScanError::InvalidImage("uploaded file is empty".to_string()));
    }
    Ok(bytes)
}

/// Accepts bare base64 or a `data:<mime>;base64,` URI. Whitespace and line
/// breaks inside the payload are ignored.
pub fn resolve_from_base64(text: &str) -> Result<Vec<u8>, ScanError> {
    let payload = strip_data_uri(text.trim());
    let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| ScanError::InvalidEncoding(e.to_string()))?;
    if bytes.is_empty() {
        return Err(ScanError::InvalidImage("image payload is empty".to_string()));
    }
    Ok(bytes)
}

fn strip_data_uri(text: &str) -> &str {
    if text.starts_with("data:") {
        if let Some(idx) = text.find(";base64,") {
            return &text[idx + ";base64,".len()..];
        }
    }
    text
}

/// Only `http` and `https` are fetched; everything else is rejected before
/// any network I/O.
pub fn validate_url(raw: &str) -> Result<Url, ScanError> {
    let url = Url::parse(raw.trim()).map_err(|e| ScanError::InvalidUrl(format!("{e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScanError::InvalidUrl(format!(
            "URL must start with http:// or https:// (got {other}://)"
        ))),
    }
}

/// The request URL is dropped from the message: it may carry signed query
/// parameters, and these errors end up in logs and response bodies.
fn classify_fetch_error(e: reqwest::Error) -> ScanError {
    let e = e.without_url();
    if e.is_timeout() {
        ScanError::Timeout
    } else if e.is_connect() {
        ScanError::Connection(e.to_string())
    } else {
        ScanError::Download(e.to_string())
    }
}
