//! Config validation with field paths in every message.

use crate::schema::ScannerConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ScannerConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_server(config, &mut report);
    validate_scan(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn validate_server(config: &ScannerConfig, report: &mut ValidationReport) {
    let server = &config.server;
    if server.bind_address.trim().is_empty() {
        report.error("server.bind_address", "Bind address cannot be empty");
    }
    if server.port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if server.port < 1024 && server.port != 80 && server.port != 443 {
        report.warn(
            "server.port",
            format!(
                "Port {} requires elevated privileges; consider using a port >= 1024",
                server.port
            ),
        );
    }
    if server.max_body_bytes == 0 {
        report.error("server.max_body_bytes", "max_body_bytes must be > 0");
    }
}

fn validate_scan(config: &ScannerConfig, report: &mut ValidationReport) {
    let scan = &config.scan;
    if scan.fetch_timeout_secs == 0 {
        report.error("scan.fetch_timeout_secs", "fetch_timeout_secs must be > 0");
    }
    if scan.processing_timeout_secs == 0 {
        report.error(
            "scan.processing_timeout_secs",
            "processing_timeout_secs must be > 0",
        );
    } else if scan.processing_timeout_secs < scan.fetch_timeout_secs {
        report.warn(
            "scan.processing_timeout_secs",
            "Processing timeout is shorter than the URL fetch timeout",
        );
    }
    if scan.max_image_size_bytes == 0 {
        report.error("scan.max_image_size_bytes", "max_image_size_bytes must be > 0");
    }
}

fn validate_logging(config: &ScannerConfig, report: &mut ValidationReport) {
    let level = config.logging.level.trim();
    if level.is_empty() {
        report.error("logging.level", "Log level cannot be empty");
    }
    if let Some(dir) = &config.logging.dir {
        if dir.trim().is_empty() {
            report.warn("logging.dir", "Empty log directory; file logging disabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let report = validate(&ScannerConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_timeouts_are_errors() {
        let mut cfg = ScannerConfig::default();
        cfg.scan.fetch_timeout_secs = 0;
        cfg.scan.processing_timeout_secs = 0;
        let report = validate(&cfg);
        assert!(!report.is_valid());
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert!(paths.contains(&"scan.fetch_timeout_secs"));
        assert!(paths.contains(&"scan.processing_timeout_secs"));
    }

    #[test]
    fn privileged_port_warns() {
        let mut cfg = ScannerConfig::default();
        cfg.server.port = 81;
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "server.port");
    }

    #[test]
    fn short_processing_timeout_warns() {
        let mut cfg = ScannerConfig::default();
        cfg.scan.processing_timeout_secs = 5;
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "scan.processing_timeout_secs");
    }
}
