//! Result Normalizer: decoded symbols in, canonical `ScanResult` out.

use crate::types::{DecodedSymbol, QrCodeEntry, ScanResult};

pub const NO_CODE_MESSAGE: &str = "No QR code detected in image";
pub const FAILURE_MESSAGE: &str = "Failed to scan image";

/// Map whatever the decoder found (possibly nothing) to a successful result.
///
/// A symbol that decoded is treated as both scannable and valid; no stricter
/// validation is layered on top of the decoder. Symbols with an empty payload
/// are not reported.
pub fn normalize(symbols: &[DecodedSymbol]) -> ScanResult {
    let qr_codes: Vec<QrCodeEntry> = symbols
        .iter()
        .filter(|symbol| !symbol.data.is_empty())
        .enumerate()
        .map(|(index, symbol)| QrCodeEntry {
            index,
            content: symbol.data.clone(),
            scannable: true,
            valid: true,
            length: symbol.data.chars().count(),
        })
        .collect();

    let qr_count = qr_codes.len();
    let qr_found = qr_count > 0;
    let message = if qr_found {
        format!("Successfully detected and scanned {qr_count} QR code(s)")
    } else {
        NO_CODE_MESSAGE.to_string()
    };

    ScanResult {
        success: true,
        qr_found,
        scannable: qr_found,
        qr_count,
        qr_codes,
        message,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_success_without_codes() {
        let r = normalize(&[]);
        assert!(r.success);
        assert!(!r.qr_found);
        assert!(!r.scannable);
        assert_eq!(r.qr_count, 0);
        assert!(r.qr_codes.is_empty());
        assert_eq!(r.message, NO_CODE_MESSAGE);
        assert!(r.error.is_none());
    }

    #[test]
    fn codes_are_indexed_in_order() {
        let r = normalize(&[DecodedSymbol::qr("first"), DecodedSymbol::qr("second")]);
        assert!(r.qr_found && r.scannable);
        assert_eq!(r.qr_count, 2);
        assert_eq!(r.message, "Successfully detected and scanned 2 QR code(s)");
        assert_eq!(r.qr_codes[1].index, 1);
        assert_eq!(r.qr_codes[1].content, "second");
        assert!(r.qr_codes.iter().all(|c| c.scannable && c.valid));
    }

    #[test]
    fn empty_payloads_are_not_codes() {
        let r = normalize(&[DecodedSymbol::qr("")]);
        assert!(r.success);
        assert!(!r.qr_found && !r.scannable);
        assert_eq!(r.qr_count, 0);
        assert_eq!(r.message, NO_CODE_MESSAGE);

        let r = normalize(&[DecodedSymbol::qr(""), DecodedSymbol::qr("kept")]);
        assert_eq!(r.qr_count, 1);
        assert_eq!(r.qr_codes[0].index, 0);
        assert_eq!(r.qr_codes[0].content, "kept");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let r = normalize(&[DecodedSymbol::qr("héllo ✓")]);
        assert_eq!(r.qr_codes[0].length, 7);
    }
}
