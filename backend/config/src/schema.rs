//! Typed configuration for the qrscan service.
//!
//! Every section has serde defaults so a partial YAML file (or none at all)
//! yields a usable config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration, built once at startup and passed by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub server: ServerConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

impl ScannerConfig {
    /// Log level after applying the debug flag.
    pub fn effective_log_level(&self) -> &str {
        if self.scan.debug && self.logging.level == LoggingConfig::DEFAULT_LEVEL {
            "debug"
        } else {
            &self.logging.level
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Upper bound on any request body the gateway will buffer.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Scan pipeline settings. Only the fetch timeout is enforced; the others
/// are advisory and reported through logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub debug: bool,
    pub processing_timeout_secs: u64,
    pub max_image_size_bytes: u64,
    pub fetch_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            debug: false,
            processing_timeout_secs: 30,
            max_image_size_bytes: 10 * 1024 * 1024,
            fetch_timeout_secs: 10,
        }
    }
}

impl ScanConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn processing_timeout(&self) -> Duration {
        Duration::from_secs(self.processing_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Directory for the daily rolling log file; console only when unset.
    pub dir: Option<String>,
}

impl LoggingConfig {
    pub const DEFAULT_LEVEL: &'static str = "info";
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::DEFAULT_LEVEL.to_string(),
            json: false,
            dir: None,
        }
    }
}
