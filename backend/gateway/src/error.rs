//! HTTP error mapping.
//!
//! Every failure, including axum extractor rejections, leaves the gateway as
//! a JSON body: `{detail}` plus the fields of a failed `ScanResult`.

use axum::{
    Json,
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use qrscan_core::{ScanError, ScanResult};
use serde::Serialize;
use tracing::warn;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: ScanError,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
    #[serde(flatten)]
    result: ScanResult,
}

/// Upstream codes outside 4xx/5xx would make a failure look like success.
fn status_for(error: &ScanError) -> StatusCode {
    StatusCode::from_u16(error.status_code())
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl ApiError {
    fn rejected(status: StatusCode, text: String) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::BAD_REQUEST
        };
        Self {
            status,
            error: ScanError::InvalidRequest(text),
        }
    }
}

impl From<ScanError> for ApiError {
    fn from(error: ScanError) -> Self {
        Self {
            status: status_for(&error),
            error,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::rejected(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::rejected(err.status(), err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(
            status = self.status.as_u16(),
            kind = self.error.kind(),
            error = %self.error,
            "Request failed"
        );
        let body = ErrorBody {
            detail: self.error.to_string(),
            result: ScanResult::failure(&self.error),
        };
        (self.status, Json(body)).into_response()
    }
}
