//! Config file discovery and loading.

use crate::env::ENV_CONFIG_PATH;
use crate::schema::ScannerConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Config file looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "qrscan.yaml";

/// Resolve which config file to read, if any.
///
/// Priority: explicit path > `QRSCAN_CONFIG` env > `./qrscan.yaml` >
/// `<user config dir>/qrscan/config.yaml`. Returns `None` when nothing exists
/// and no path was requested.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        if !p.trim().is_empty() {
            return Some(PathBuf::from(p));
        }
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|d| d.join("qrscan").join("config.yaml"))
        .filter(|p| p.exists())
}

/// Load and parse a YAML config file.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<ScannerConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(ScannerConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: ScannerConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let cfg = load_config(Path::new("/definitely/not/here.yaml")).await.unwrap();
        assert_eq!(cfg, ScannerConfig::default());
    }

    #[tokio::test]
    async fn reads_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server:\n  port: 9090\nlogging:\n  json: true").unwrap();
        let cfg = load_config(file.path()).await.unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert!(cfg.logging.json);
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "server: [not, a, map").unwrap();
        let err = load_config(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[test]
    fn explicit_path_wins() {
        let p = resolve_config_path(Some(Path::new("custom.yaml")));
        assert_eq!(p, Some(PathBuf::from("custom.yaml")));
    }
}
