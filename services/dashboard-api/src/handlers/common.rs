//! Response helpers shared across dashboard handlers.

use axum::{
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;

use flood_common::DashboardError;

/// Error response body: `{"error": <stable code>, "message": <detail>}`.
///
/// Status comes from the error's own HTTP mapping, so handlers can
/// surface any [`DashboardError`] without per-variant match arms.
pub fn error_response(err: &DashboardError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
        "error": err.error_code(),
        "message": err.to_string(),
    });
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.to_string().into())
        .unwrap()
}

/// PNG image response for a rendered overlay.
pub fn png_response(png: Bytes) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "image/png")
        .body(png.into())
        .unwrap()
}
