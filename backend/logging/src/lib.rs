//! Structured logging for qrscan.
//!
//! Handles subscriber setup (console, optional rolling file, text or JSON) and
//! scrubbing credentials out of URLs before they reach a log line.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions, LogTarget};
pub use redact::redact_url;
