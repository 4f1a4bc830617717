//! Scan Pipeline
//!
//! resolve -> decode -> normalize. Every surface (HTTP, MCP tools, CLI) goes
//! through `Scanner`, so identical bytes give identical results no matter how
//! they arrived.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use qrscan_config::ScanConfig;
use qrscan_core::{
    BatchEntry, BatchImage, BatchResponse, DecodedSymbol, ImageSource, QrDecoder, ScanError,
    ScanResult,
};
use tracing::{debug, info, instrument, warn};

use crate::decoder::RqrrDecoder;
use crate::resolver::InputResolver;

/// Batch entries without a `name` are reported under this label.
pub const UNNAMED_IMAGE: &str = "unknown";

#[derive(Clone)]
pub struct Scanner {
    resolver: InputResolver,
    decoder: Arc<dyn QrDecoder>,
    max_image_size_bytes: u64,
    processing_timeout: Duration,
}

impl Scanner {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Self::with_decoder(config, Arc::new(RqrrDecoder))
    }

    pub fn with_decoder(config: &ScanConfig, decoder: Arc<dyn QrDecoder>) -> Result<Self> {
        let resolver =
            InputResolver::new(config.fetch_timeout()).context("Failed to build HTTP client")?;
        info!(
            decoder = decoder.name(),
            fetch_timeout_secs = config.fetch_timeout_secs,
            "Scanner ready"
        );
        Ok(Self {
            resolver,
            decoder,
            max_image_size_bytes: config.max_image_size_bytes,
            processing_timeout: config.processing_timeout(),
        })
    }

    pub fn decoder_name(&self) -> &str {
        self.decoder.name()
    }

    /// Scan one image, keeping the typed error so callers can map it
    /// (the gateway turns it into an HTTP status).
    #[instrument(skip_all, fields(source = source.kind()))]
    pub async fn try_scan(&self, source: ImageSource) -> Result<ScanResult, ScanError> {
        let bytes = self.resolver.resolve(source).await?;
        if bytes.len() as u64 > self.max_image_size_bytes {
            warn!(
                bytes = bytes.len(),
                limit = self.max_image_size_bytes,
                "Image exceeds configured size limit; scanning anyway"
            );
        }

        let symbols = self.decode(bytes).await?;
        let result = ScanResult::from_symbols(&symbols);
        info!(qr_count = result.qr_count, "Scan complete");
        Ok(result)
    }

    /// Scan one image; failures are folded into the result.
    pub async fn scan(&self, source: ImageSource) -> ScanResult {
        match self.try_scan(source).await {
            Ok(result) => result,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Scan failed");
                ScanResult::failure(&e)
            }
        }
    }

    /// Scan base64 images in order. One bad entry never aborts the rest.
    pub async fn scan_batch(&self, images: Vec<BatchImage>) -> BatchResponse {
        let mut results = Vec::with_capacity(images.len());
        for (i, image) in images.into_iter().enumerate() {
            let name = image.name.unwrap_or_else(|| UNNAMED_IMAGE.to_string());
            let result = match image.data {
                Some(data) => self.scan(ImageSource::Base64(data)).await,
                None => {
                    debug!(entry = i, name = %name, "Batch entry has no data");
                    ScanResult::failure(&ScanError::InvalidRequest(
                        "Missing 'data' in image entry".to_string(),
                    ))
                }
            };
            results.push(BatchEntry { name, result });
        }
        BatchResponse::from(results)
    }

    // Decoding is CPU bound; keep it off the async workers.
    async fn decode(&self, bytes: Vec<u8>) -> Result<Vec<DecodedSymbol>, ScanError> {
        let decoder = Arc::clone(&self.decoder);
        let started = Instant::now();
        let symbols = tokio::task::spawn_blocking(move || decoder.decode(&bytes))
            .await
            .map_err(|e| ScanError::Decode(format!("decoder task failed: {e}")))??;

        let elapsed = started.elapsed();
        if elapsed > self.processing_timeout {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                limit_secs = self.processing_timeout.as_secs(),
                "Decoding exceeded the processing timeout"
            );
        } else {
            debug!(elapsed_ms = elapsed.as_millis() as u64, symbols = symbols.len(), "Decoded");
        }
        Ok(symbols)
    }
}
