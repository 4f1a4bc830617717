use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::normalize::FAILURE_MESSAGE;

/// One of the four ways a caller can hand us an image.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Upload(Vec<u8>),
    Base64(String),
    Url(String),
}

impl ImageSource {
    /// Variant label for logs and spans.
    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Path(_) => "path",
            ImageSource::Upload(_) => "upload",
            ImageSource::Base64(_) => "base64",
            ImageSource::Url(_) => "url",
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => f.debug_tuple("Path").field(p).finish(),
            ImageSource::Upload(bytes) => write!(f, "Upload({} bytes)", bytes.len()),
            ImageSource::Base64(text) => write!(f, "Base64({} chars)", text.len()),
            ImageSource::Url(u) => f.debug_tuple("Url").field(u).finish(),
        }
    }
}

/// Symbology reported by the decoder. Only QR codes are produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolFormat {
    QrCode,
}

/// Pixel coordinate of a symbol corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// A symbol as handed back by the decoding library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSymbol {
    pub data: String,
    pub format: SymbolFormat,
    /// Corner points, clockwise from top-left, when the decoder reports them.
    pub position: Option<[Point; 4]>,
}

impl DecodedSymbol {
    pub fn qr(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: SymbolFormat::QrCode,
            position: None,
        }
    }
}

/// Per-code descriptor inside a `ScanResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrCodeEntry {
    pub index: usize,
    pub content: String,
    pub scannable: bool,
    pub valid: bool,
    pub length: usize,
}

/// The canonical response returned by every transport.
///
/// Build it with [`ScanResult::from_symbols`] or [`ScanResult::failure`];
/// both keep `qr_found == (qr_count > 0)`, `scannable == qr_found` and
/// `qr_count == qr_codes.len()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub success: bool,
    pub qr_found: bool,
    pub scannable: bool,
    pub qr_count: usize,
    pub qr_codes: Vec<QrCodeEntry>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScanResult {
    pub fn from_symbols(symbols: &[DecodedSymbol]) -> Self {
        crate::normalize::normalize(symbols)
    }

    pub fn failure(err: &ScanError) -> Self {
        Self {
            success: false,
            qr_found: false,
            scannable: false,
            qr_count: 0,
            qr_codes: Vec::new(),
            message: FAILURE_MESSAGE.to_string(),
            error: Some(err.to_string()),
        }
    }

    pub fn from_outcome(outcome: Result<ScanResult, ScanError>) -> Self {
        outcome.unwrap_or_else(|e| Self::failure(&e))
    }

    pub fn contents(&self) -> impl Iterator<Item = &str> {
        self.qr_codes.iter().map(|c| c.content.as_str())
    }
}

/// One entry of a `/scan/batch` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchImage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub name: String,
    pub result: ScanResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub total_images: usize,
    pub results: Vec<BatchEntry>,
}

impl From<Vec<BatchEntry>> for BatchResponse {
    fn from(results: Vec<BatchEntry>) -> Self {
        Self {
            total_images: results.len(),
            results,
        }
    }
}
