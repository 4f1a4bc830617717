use async_trait::async_trait;

use crate::error::ScanError;
use crate::types::DecodedSymbol;

/// The seam between this service and the library that actually reads QR codes.
///
/// Implementations are CPU-bound and synchronous; async callers should run
/// them on a blocking thread.
pub trait QrDecoder: Send + Sync {
    /// Library name, for logs.
    fn name(&self) -> &str;

    /// Decode every symbol found in an encoded image (PNG, JPEG, ...).
    ///
    /// Returns `InvalidImage` when the bytes are not an image at all, and an
    /// empty list when the image simply contains no readable code.
    fn decode(&self, image_bytes: &[u8]) -> Result<Vec<DecodedSymbol>, ScanError>;
}

/// An operation an external agent can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of the tool (e.g., "scan_qr_code_from_url").
    fn name(&self) -> &str;

    /// Description shown to the calling agent.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's parameters.
    fn parameters(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments, returning JSON text.
    async fn execute(&self, args: serde_json::Value) -> Result<String, anyhow::Error>;
}
