//! Scan endpoints (`/scan/*`).
//!
//! Thin adapters: extract the input, hand it to the shared `Scanner`, map a
//! typed failure to an HTTP status.

use axum::{
    Json,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
};
use qrscan_core::{BatchImage, BatchResponse, ImageSource, ScanError, ScanResult};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub image_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Base64Request {
    pub image_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct UrlRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub images: Vec<BatchImage>,
}

/// Handler for `GET /scan/file?image_path=...`
pub async fn scan_file(
    State(state): State<GatewayState>,
    query: Result<Query<FileQuery>, QueryRejection>,
) -> Result<Json<ScanResult>, ApiError> {
    let Query(query) = query?;
    let result = state
        .scanner
        .try_scan(ImageSource::Path(query.image_path.into()))
        .await?;
    Ok(Json(result))
}

/// Handler for `POST /scan/upload` (multipart, field `file`).
pub async fn scan_upload(
    State(state): State<GatewayState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ScanResult>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        debug!(filename = %filename, bytes = bytes.len(), "Received upload");
        upload = Some(bytes.to_vec());
        break;
    }

    let bytes = upload.ok_or_else(|| {
        ScanError::InvalidRequest("Missing multipart field 'file'".to_string())
    })?;
    let result = state.scanner.try_scan(ImageSource::Upload(bytes)).await?;
    Ok(Json(result))
}

/// Handler for `POST /scan/base64`
pub async fn scan_base64(
    State(state): State<GatewayState>,
    payload: Result<Json<Base64Request>, JsonRejection>,
) -> Result<Json<ScanResult>, ApiError> {
    let Json(request) = payload?;
    let result = state
        .scanner
        .try_scan(ImageSource::Base64(request.image_base64))
        .await?;
    Ok(Json(result))
}

/// Handler for `POST /scan/url`
pub async fn scan_url(
    State(state): State<GatewayState>,
    payload: Result<Json<UrlRequest>, JsonRejection>,
) -> Result<Json<ScanResult>, ApiError> {
    let Json(request) = payload?;
    let result = state.scanner.try_scan(ImageSource::Url(request.url)).await?;
    Ok(Json(result))
}

/// Handler for `POST /scan/batch`. Per-image failures are embedded in the
/// response; only a malformed body fails the whole request.
pub async fn scan_batch(
    State(state): State<GatewayState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let Json(request) = payload?;
    let response = state.scanner.scan_batch(request.images).await;
    let failed = response.results.iter().filter(|e| !e.result.success).count();
    info!(total = response.total_images, failed, "Batch scan complete");
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;

    use axum::{Router, http::StatusCode, routing::get};
    use base64::{Engine, engine::general_purpose::STANDARD};
    use qrscan_config::{ScanConfig, ServerConfig};
    use qrscan_scanner::{Scanner, fixtures};
    use reqwest::multipart::{Form, Part};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use crate::server::{GatewayState, serve};

    async fn spawn_gateway() -> String {
        let scanner = Arc::new(Scanner::new(&ScanConfig::default()).unwrap());
        let state = GatewayState::new(scanner, &ServerConfig::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state));
        format!("http://{addr}")
    }

    async fn spawn_image_host(png: Vec<u8>) -> SocketAddr {
        let app = Router::new()
            .route(
                "/label.png",
                get(move || {
                    let png = png.clone();
                    async move { png }
                }),
            )
            .route("/gone.png", get(|| async { StatusCode::NOT_FOUND }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn post_json(url: String, body: Value) -> (u16, Value) {
        let resp = reqwest::Client::new()
            .post(url)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let base = spawn_gateway().await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "qr-code-scanner");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn root_lists_endpoints() {
        let base = spawn_gateway().await;
        let body: Value = reqwest::get(format!("{base}/"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        for key in ["scan_file", "scan_upload", "scan_url", "scan_base64", "scan_batch", "health"] {
            assert!(body["endpoints"][key].is_string(), "{key}");
        }
    }

    #[tokio::test]
    async fn file_scan_by_query() {
        let base = spawn_gateway().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, fixtures::qr_png("SKU-001")).unwrap();

        let resp = reqwest::Client::new()
            .get(format!("{base}/scan/file"))
            .query(&[("image_path", path.to_str().unwrap())])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["qr_codes"][0]["content"], "SKU-001");
    }

    #[tokio::test]
    async fn missing_file_is_404_with_body() {
        let base = spawn_gateway().await;
        let resp = reqwest::get(format!("{base}/scan/file?image_path=nonexistent/path.jpg"))
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["detail"].as_str().unwrap().contains("nonexistent/path.jpg"));
    }

    #[tokio::test]
    async fn missing_query_param_is_400_json() {
        let base = spawn_gateway().await;
        let resp = reqwest::get(format!("{base}/scan/file")).await.unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn upload_and_base64_agree() {
        let base = spawn_gateway().await;
        let png = fixtures::qr_png("shared payload");

        let form = Form::new().part(
            "file",
            Part::bytes(png.clone())
                .file_name("label.png")
                .mime_str("image/png")
                .unwrap(),
        );
        let upload: Value = reqwest::Client::new()
            .post(format!("{base}/scan/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let (status, by_base64) = post_json(
            format!("{base}/scan/base64"),
            json!({ "image_base64": STANDARD.encode(&png) }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(upload, by_base64);
        assert_eq!(upload["qr_count"], 1);
    }

    #[tokio::test]
    async fn upload_without_file_field_is_400() {
        let base = spawn_gateway().await;
        let form = Form::new().text("note", "no image here");
        let resp = reqwest::Client::new()
            .post(format!("{base}/scan/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn bad_base64_and_bad_json_are_400() {
        let base = spawn_gateway().await;
        let (status, body) = post_json(
            format!("{base}/scan/base64"),
            json!({ "image_base64": "invalid base64 data" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);

        let (status, body) = post_json(format!("{base}/scan/base64"), json!({ "wrong": 1 })).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);

        let resp = reqwest::Client::new()
            .post(format!("{base}/scan/url"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn url_scan_statuses() {
        let base = spawn_gateway().await;
        let host = spawn_image_host(fixtures::qr_png("from the web")).await;

        let (status, body) = post_json(
            format!("{base}/scan/url"),
            json!({ "url": "ftp://example.com/a.png" }),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
        assert_eq!(body["qr_found"], false);

        let (status, body) = post_json(
            format!("{base}/scan/url"),
            json!({ "url": format!("http://{host}/label.png") }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["qr_codes"][0]["content"], "from the web");

        let (status, body) = post_json(
            format!("{base}/scan/url"),
            json!({ "url": format!("http://{host}/gone.png") }),
        )
        .await;
        assert_eq!(status, 404);
        assert_eq!(body["detail"], "HTTP error: 404");
    }

    #[tokio::test]
    async fn batch_preserves_order_with_embedded_failure() {
        let base = spawn_gateway().await;
        let (status, body) = post_json(
            format!("{base}/scan/batch"),
            json!({
                "images": [
                    { "name": "a.png", "data": STANDARD.encode(fixtures::qr_png("A")) },
                    { "name": "b.png", "data": "invalid base64 data" },
                    { "name": "c.png", "data": STANDARD.encode(fixtures::blank_png(40, 40)) }
                ]
            }),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["total_images"], 3);
        let results = body["results"].as_array().unwrap();
        let names: Vec<_> = results.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
        assert_eq!(results[0]["result"]["qr_codes"][0]["content"], "A");
        assert_eq!(results[1]["result"]["success"], false);
        assert_eq!(results[2]["result"]["success"], true);
        assert_eq!(results[2]["result"]["qr_found"], false);
    }

    #[tokio::test]
    async fn batch_without_images_is_400() {
        let base = spawn_gateway().await;
        let (status, body) = post_json(format!("{base}/scan/batch"), json!({})).await;
        assert_eq!(status, 400);
        assert_eq!(body["success"], false);
    }
}
