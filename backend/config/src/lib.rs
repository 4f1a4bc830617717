//! `qrscan-config`: runtime configuration for the qrscan service.
//!
//! Provides:
//! - Typed config schema with defaults
//! - YAML file discovery and loading
//! - Environment variable overrides
//! - Validation with errors and warnings

pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, apply_env_overrides_with, EnvParseError};
pub use io::{load_config, resolve_config_path};
pub use schema::{LoggingConfig, ScanConfig, ScannerConfig, ServerConfig};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Load the file (if any), apply env overrides, and validate.
///
/// This is the main entry point for loading a config at runtime. Any
/// validation error aborts startup; warnings are handed back so the caller can
/// log them once the subscriber is installed.
pub async fn load_and_prepare(
    explicit_path: Option<&Path>,
) -> Result<(ScannerConfig, Vec<ConfigValidationError>)> {
    load_and_prepare_with(explicit_path, |_| {}).await
}

/// Like [`load_and_prepare`], with a final override layer (CLI flags) applied
/// after the environment and before validation.
pub async fn load_and_prepare_with(
    explicit_path: Option<&Path>,
    overrides: impl FnOnce(&mut ScannerConfig),
) -> Result<(ScannerConfig, Vec<ConfigValidationError>)> {
    let mut config = match resolve_config_path(explicit_path) {
        Some(path) => load_config(&path).await?,
        None => ScannerConfig::default(),
    };

    apply_env_overrides(&mut config).context("Failed to apply environment overrides")?;
    overrides(&mut config);

    let warnings = check(&config)?;
    Ok((config, warnings))
}

/// Fail on the first validation error; otherwise return the warnings.
pub fn check(config: &ScannerConfig) -> Result<Vec<ConfigValidationError>> {
    let report = validate(config);
    if let Some(first) = report.errors.first() {
        bail!(
            "invalid configuration ({} error(s)): {first}",
            report.errors.len()
        );
    }
    Ok(report.warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_zero_port() {
        let mut config = ScannerConfig::default();
        assert!(check(&config).is_ok());
        config.server.port = 0;
        let err = check(&config).unwrap_err();
        assert!(err.to_string().contains("server.port"), "{err}");
    }

    #[tokio::test]
    async fn overrides_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qrscan.yaml");
        std::fs::write(&path, "server:\n  port: 8080\n").unwrap();

        let (config, _) = load_and_prepare_with(Some(&path), |c| c.server.port = 9001)
            .await
            .unwrap();
        assert_eq!(config.server.port, 9001);

        let err = load_and_prepare_with(Some(&path), |c| c.server.bind_address.clear())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("server.bind_address"), "{err}");
    }
}
