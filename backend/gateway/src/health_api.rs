//! Gateway Health API
//!
//! `GET /health` for liveness probes and `GET /` for a self-description of
//! the API surface.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::server::GatewayState;

pub const SERVICE_NAME: &str = "qr-code-scanner";

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}

/// Handler for `GET /`
pub async fn get_info() -> Json<Value> {
    Json(json!({
        "service": "QR Code Scanner API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "scan_file": "/scan/file?image_path=path/to/image.jpg",
            "scan_upload": "/scan/upload (POST multipart with field 'file')",
            "scan_url": "/scan/url (POST with JSON: {\"url\": \"https://...\"})",
            "scan_base64": "/scan/base64 (POST with JSON: {\"image_base64\": \"...\"})",
            "scan_batch": "/scan/batch (POST with JSON: {\"images\": [{\"name\": \"...\", \"data\": \"...\"}]})",
            "health": "/health"
        }
    }))
}
