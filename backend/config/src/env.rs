//! Environment variable overrides for `ScannerConfig`.
//!
//! Variables are read once, at load time. Business logic never looks at the
//! process environment.

use std::collections::HashMap;
use std::str::FromStr;

use crate::schema::ScannerConfig;

pub const ENV_CONFIG_PATH: &str = "QRSCAN_CONFIG";
pub const ENV_BIND: &str = "QRSCAN_BIND";
/// Plain `PORT` is honoured for container platforms that inject it.
pub const ENV_PLATFORM_PORT: &str = "PORT";
pub const ENV_PORT: &str = "QRSCAN_PORT";
pub const ENV_MAX_BODY_BYTES: &str = "QRSCAN_MAX_BODY_BYTES";
pub const ENV_DEBUG: &str = "QRSCAN_DEBUG";
pub const ENV_PROCESSING_TIMEOUT: &str = "QRSCAN_PROCESSING_TIMEOUT";
pub const ENV_MAX_IMAGE_SIZE: &str = "QRSCAN_MAX_IMAGE_SIZE";
pub const ENV_FETCH_TIMEOUT: &str = "QRSCAN_FETCH_TIMEOUT";
pub const ENV_LOG_LEVEL: &str = "QRSCAN_LOG_LEVEL";
pub const ENV_LOG_JSON: &str = "QRSCAN_LOG_JSON";
pub const ENV_LOG_DIR: &str = "QRSCAN_LOG_DIR";

/// An env var was set but its value could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value {value:?} for env var {var_name}: expected {expected}")]
pub struct EnvParseError {
    pub var_name: String,
    pub value: String,
    pub expected: &'static str,
}

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut ScannerConfig) -> Result<(), EnvParseError> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
pub fn apply_env_overrides_with(
    config: &mut ScannerConfig,
    env: &HashMap<String, String>,
) -> Result<(), EnvParseError> {
    if let Some(v) = non_empty(env, ENV_BIND) {
        config.server.bind_address = v.to_string();
    }
    if let Some(port) = parse_num(env, ENV_PLATFORM_PORT)? {
        config.server.port = port;
    }
    if let Some(port) = parse_num(env, ENV_PORT)? {
        config.server.port = port;
    }
    if let Some(n) = parse_num(env, ENV_MAX_BODY_BYTES)? {
        config.server.max_body_bytes = n;
    }

    if let Some(b) = parse_bool(env, ENV_DEBUG)? {
        config.scan.debug = b;
    }
    if let Some(n) = parse_num(env, ENV_PROCESSING_TIMEOUT)? {
        config.scan.processing_timeout_secs = n;
    }
    if let Some(n) = parse_num(env, ENV_MAX_IMAGE_SIZE)? {
        config.scan.max_image_size_bytes = n;
    }
    if let Some(n) = parse_num(env, ENV_FETCH_TIMEOUT)? {
        config.scan.fetch_timeout_secs = n;
    }

    if let Some(v) = non_empty(env, ENV_LOG_LEVEL) {
        config.logging.level = v.to_string();
    }
    if let Some(b) = parse_bool(env, ENV_LOG_JSON)? {
        config.logging.json = b;
    }
    if let Some(v) = non_empty(env, ENV_LOG_DIR) {
        config.logging.dir = Some(v.to_string());
    }

    Ok(())
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_num<T: FromStr>(
    env: &HashMap<String, String>,
    key: &str,
) -> Result<Option<T>, EnvParseError> {
    let Some(raw) = non_empty(env, key) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| EnvParseError {
        var_name: key.to_string(),
        value: raw.to_string(),
        expected: "a non-negative integer",
    })
}

fn parse_bool(env: &HashMap<String, String>, key: &str) -> Result<Option<bool>, EnvParseError> {
    let Some(raw) = non_empty(env, key) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(EnvParseError {
            var_name: key.to_string(),
            value: raw.to_string(),
            expected: "a boolean (true/false/1/0)",
        }),
    }
}
