//! Request correlation.
//!
//! Every request carries an `x-request-id`: the caller's, or a UUID v4
//! assigned by the server layer. The same value is echoed on the response.

use axum::http::{HeaderMap, HeaderName};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// The request id set by the server layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
