//! `qrscan-scanner`: the shared scan pipeline.
//!
//! - [`InputResolver`]: path, upload, base64 or URL to raw bytes
//! - [`RqrrDecoder`]: the default [`qrscan_core::QrDecoder`]
//! - [`Scanner`]: resolve, decode off the async runtime, normalize

pub mod decoder;
pub mod pipeline;
pub mod resolver;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use decoder::RqrrDecoder;
pub use pipeline::{Scanner, UNNAMED_IMAGE};
pub use resolver::InputResolver;
