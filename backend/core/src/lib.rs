//! Core types, traits, and result normalization for the qrscan service.
//!
//! Everything both transports (HTTP and tool-call) agree on lives here: the
//! input variants, the decoded-symbol shape, the canonical `ScanResult`, and
//! the error taxonomy.

pub mod error;
pub mod normalize;
pub mod tools;
pub mod traits;
pub mod types;

pub use error::ScanError;
pub use normalize::{normalize, FAILURE_MESSAGE, NO_CODE_MESSAGE};
pub use tools::{ToolDescriptor, ToolRegistry};
pub use traits::{QrDecoder, Tool};
pub use types::{
    BatchEntry, BatchImage, BatchResponse, DecodedSymbol, ImageSource, Point, QrCodeEntry,
    ScanResult, SymbolFormat,
};
