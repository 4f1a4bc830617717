//! Delegated QR decoder backed by `rqrr`.

use qrscan_core::{DecodedSymbol, Point, QrDecoder, ScanError, SymbolFormat};
use tracing::debug;

/// Decodes every QR symbol `rqrr` can locate in an encoded image.
///
/// Grids that are detected but fail error correction are dropped, and so are
/// grids that decode to an empty payload; callers only ever see symbols with
/// readable content.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl QrDecoder for RqrrDecoder {
    fn name(&self) -> &str {
        "rqrr"
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<DecodedSymbol>, ScanError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| ScanError::InvalidImage(e.to_string()))?;
        let luma = img.to_luma8();
        let (width, height) = luma.dimensions();

        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(width as usize, height as usize, |x, y| {
                luma.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        debug!(width, height, grids = grids.len(), "Located QR grids");

        let mut symbols = Vec::with_capacity(grids.len());
        for (i, grid) in grids.iter().enumerate() {
            match grid.decode() {
                Ok((_meta, content)) if content.is_empty() => {
                    debug!(grid = i, "Skipping QR grid with empty payload")
                }
                Ok((_meta, content)) => symbols.push(DecodedSymbol {
                    data: content,
                    format: SymbolFormat::QrCode,
                    position: Some(grid.bounds.map(|p| Point { x: p.x, y: p.y })),
                }),
                Err(e) => debug!(grid = i, error = ?e, "Skipping undecodable QR grid"),
            }
        }
        Ok(symbols)
    }
}
