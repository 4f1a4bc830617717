//! PNG generators for tests. Compiled under `cfg(test)` or the
//! `test-fixtures` feature.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};
use qrcode::{Color, QrCode};

const SCALE: u32 = 8;
const QUIET_ZONE: u32 = 4;

/// Renders `text` as a single QR code with a quiet zone, encoded as PNG.
pub fn qr_png(text: &str) -> Vec<u8> {
    encode_png(render(text))
}

/// Two codes side by side on one canvas.
pub fn qr_pair_png(left: &str, right: &str) -> Vec<u8> {
    let a = render(left);
    let b = render(right);
    let width = a.width() + b.width();
    let height = a.height().max(b.height());
    let mut canvas = GrayImage::from_pixel(width, height, Luma([255]));
    image::imageops::replace(&mut canvas, &a, 0, 0);
    image::imageops::replace(&mut canvas, &b, i64::from(a.width()), 0);
    encode_png(canvas)
}

/// A uniformly white PNG.
pub fn blank_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(GrayImage::from_pixel(width, height, Luma([255])))
}

fn render(text: &str) -> GrayImage {
    let code = QrCode::new(text.as_bytes()).expect("fixture text fits in a QR code");
    let modules = code.width() as u32;
    let side = (modules + 2 * QUIET_ZONE) * SCALE;

    GrayImage::from_fn(side, side, |px, py| {
        let mx = (px / SCALE).checked_sub(QUIET_ZONE);
        let my = (py / SCALE).checked_sub(QUIET_ZONE);
        match (mx, my) {
            (Some(x), Some(y)) if x < modules && y < modules => {
                match code[(x as usize, y as usize)] {
                    Color::Dark => Luma([0]),
                    Color::Light => Luma([255]),
                }
            }
            _ => Luma([255]),
        }
    })
}

fn encode_png(img: GrayImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .expect("PNG encoding to memory");
    buf.into_inner()
}
