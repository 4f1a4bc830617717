use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use qrscan_core::{ImageSource, ScanError, ScanResult, Tool, ToolRegistry};
use qrscan_scanner::Scanner;
use serde_json::Value;
use tracing::debug;

/// Registry with all three scan tools sharing one `Scanner`.
pub fn default_registry(scanner: Arc<Scanner>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(ScanFileTool::new(Arc::clone(&scanner))));
    registry.register(Arc::new(ScanBase64Tool::new(Arc::clone(&scanner))));
    registry.register(Arc::new(ScanUrlTool::new(scanner)));
    registry
}

// Empty strings count as missing.
fn string_arg<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn render(result: &ScanResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

fn missing(key: &str) -> anyhow::Result<String> {
    debug!(argument = key, "Tool called without required argument");
    render(&ScanResult::failure(&ScanError::InvalidRequest(format!(
        "{key} is required"
    ))))
}

fn single_string_schema(key: &str, description: &str) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            key: {
                "type": "string",
                "description": description
            }
        },
        "required": [key]
    })
}

pub struct ScanFileTool {
    scanner: Arc<Scanner>,
}

impl ScanFileTool {
    pub fn new(scanner: Arc<Scanner>) -> Self {
        Self { scanner }
    }
}

#[async_trait]
impl Tool for ScanFileTool {
    fn name(&self) -> &str {
        "scan_qr_code_from_file"
    }

    fn description(&self) -> &str {
        "Scan and validate QR codes in a label image file. Returns whether a QR code is present and if it's scannable."
    }

    fn parameters(&self) -> Value {
        single_string_schema(
            "image_path",
            "Path to the image file (supports PNG, JPG, BMP, etc.)",
        )
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let Some(path) = string_arg(&args, "image_path") else {
            return missing("image_path");
        };
        let result = self.scanner.scan(ImageSource::Path(PathBuf::from(path))).await;
        render(&result)
    }
}

pub struct ScanBase64Tool {
    scanner: Arc<Scanner>,
}

impl ScanBase64Tool {
    pub fn new(scanner: Arc<Scanner>) -> Self {
        Self { scanner }
    }
}

#[async_trait]
impl Tool for ScanBase64Tool {
    fn name(&self) -> &str {
        "scan_qr_code_from_base64"
    }

    fn description(&self) -> &str {
        "Scan and validate QR codes in a base64 encoded image. Returns whether a QR code is present and if it's scannable."
    }

    fn parameters(&self) -> Value {
        single_string_schema(
            "image_base64",
            "Base64 encoded image data (PNG, JPG, BMP, etc.)",
        )
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let Some(data) = string_arg(&args, "image_base64") else {
            return missing("image_base64");
        };
        let result = self.scanner.scan(ImageSource::Base64(data.to_string())).await;
        render(&result)
    }
}

pub struct ScanUrlTool {
    scanner: Arc<Scanner>,
}

impl ScanUrlTool {
    pub fn new(scanner: Arc<Scanner>) -> Self {
        Self { scanner }
    }
}

#[async_trait]
impl Tool for ScanUrlTool {
    fn name(&self) -> &str {
        "scan_qr_code_from_url"
    }

    fn description(&self) -> &str {
        "Scan and validate QR codes from an image URL. Downloads the image and analyzes it for QR codes. Supports HTTP and HTTPS URLs."
    }

    fn parameters(&self) -> Value {
        single_string_schema("url", "HTTP/HTTPS URL to the image (PNG, JPG, BMP, etc.)")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let Some(url) = string_arg(&args, "url") else {
            return missing("url");
        };
        let result = self.scanner.scan(ImageSource::Url(url.to_string())).await;
        render(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};
    use qrscan_config::ScanConfig;
    use qrscan_scanner::fixtures;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let scanner = Scanner::new(&ScanConfig::default()).unwrap();
        default_registry(Arc::new(scanner))
    }

    async fn call(name: &str, args: Value) -> ScanResult {
        let tool = registry().get(name).unwrap();
        let text = tool.execute(args).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn registers_three_tools_in_sorted_order() {
        let registry = registry();
        assert_eq!(
            registry.list(),
            vec![
                "scan_qr_code_from_base64",
                "scan_qr_code_from_file",
                "scan_qr_code_from_url"
            ]
        );
        for descriptor in registry.descriptors() {
            assert_eq!(descriptor.input_schema["type"], "object");
            assert_eq!(descriptor.input_schema["required"].as_array().unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn file_tool_scans_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, fixtures::qr_png("LOT-4411")).unwrap();

        let result = call(
            "scan_qr_code_from_file",
            json!({ "image_path": path.to_str().unwrap() }),
        )
        .await;
        assert!(result.success);
        assert_eq!(result.contents().collect::<Vec<_>>(), vec!["LOT-4411"]);
    }

    #[tokio::test]
    async fn base64_tool_matches_file_tool() {
        let png = fixtures::qr_png("same bytes");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("same.png");
        std::fs::write(&path, &png).unwrap();

        let by_file = call(
            "scan_qr_code_from_file",
            json!({ "image_path": path.to_str().unwrap() }),
        )
        .await;
        let by_base64 = call(
            "scan_qr_code_from_base64",
            json!({ "image_base64": STANDARD.encode(&png) }),
        )
        .await;
        assert_eq!(by_file, by_base64);
    }

    #[tokio::test]
    async fn missing_argument_is_failed_result() {
        let result = call("scan_qr_code_from_file", json!({})).await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Invalid request: image_path is required")
        );

        let result = call("scan_qr_code_from_url", json!({ "url": "" })).await;
        assert_eq!(result.error.as_deref(), Some("Invalid request: url is required"));
    }

    #[tokio::test]
    async fn url_tool_rejects_non_http_scheme() {
        let result = call("scan_qr_code_from_url", json!({ "url": "ftp://example.com/a.png" })).await;
        assert!(!result.success);
        assert!(!result.qr_found);
        assert!(result.error.unwrap().contains("http:// or https://"));
    }
}
