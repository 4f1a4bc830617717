use thiserror::Error;

/// Every way a single scan request can fail.
///
/// Transports never let these escape: HTTP maps them to a status code plus a
/// JSON body, tools fold them into a failed `ScanResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("Image file not found or unreadable: {0}")]
    NotFound(String),

    #[error("Failed to decode image: {0}")]
    InvalidImage(String),

    #[error("Invalid base64 image data: {0}")]
    InvalidEncoding(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timeout - URL took too long to respond")]
    Timeout,

    #[error("Could not connect to URL: {0}")]
    Connection(String),

    #[error("HTTP error: {status}")]
    HttpStatus { status: u16 },

    #[error("Error downloading image: {0}")]
    Download(String),

    #[error("QR decoding failed: {0}")]
    Decode(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ScanError {
    /// HTTP status code conventionally associated with this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ScanError::NotFound(_) => 404,
            ScanError::InvalidImage(_)
            | ScanError::InvalidEncoding(_)
            | ScanError::InvalidUrl(_)
            | ScanError::Download(_)
            | ScanError::InvalidRequest(_) => 400,
            ScanError::Timeout => 408,
            ScanError::Connection(_) => 503,
            ScanError::HttpStatus { status } => *status,
            ScanError::Decode(_) => 500,
        }
    }

    /// Short machine-readable label, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::NotFound(_) => "not_found",
            ScanError::InvalidImage(_) => "invalid_image",
            ScanError::InvalidEncoding(_) => "invalid_encoding",
            ScanError::InvalidUrl(_) => "invalid_url",
            ScanError::Timeout => "timeout",
            ScanError::Connection(_) => "connection",
            ScanError::HttpStatus { .. } => "http_status",
            ScanError::Download(_) => "download",
            ScanError::Decode(_) => "decode",
            ScanError::InvalidRequest(_) => "invalid_request",
        }
    }
}
