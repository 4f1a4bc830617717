//! Structured Logger
//!
//! Wraps `tracing` to provide text or JSON console output, an optional daily
//! rolling file (NDJSON), and environment-based level control.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
    Layer,
};

/// Where console output goes. The MCP server owns stdout, so it logs to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogTarget {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    pub level: String,
    pub json: bool,
    pub dir: Option<PathBuf>,
    pub target: LogTarget,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            dir: None,
            target: LogTarget::Stdout,
        }
    }
}

/// Initialize the global structured logger.
///
/// `RUST_LOG` takes precedence over `options.level`.
pub fn init_logger(options: &LogOptions) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let writer = match options.target {
        LogTarget::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
    };
    let ansi = options.target == LogTarget::Stdout && !options.json;

    let console_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(writer)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(writer)
            .with_target(false)
            .with_ansi(ansi)
            .boxed()
    };

    // Rolling file appender: writes NDJSON to `<dir>/qrscan.log.YYYY-MM-DD`
    let file_layer = options.dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "qrscan.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
            .boxed()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))
}
