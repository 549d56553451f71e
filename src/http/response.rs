//! Error responses.
//!
//! Controller errors become a status code and a `{ "error", "kind" }` body.
//! Upstream wallet or chain failures map to 502, their timeouts to 504.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::session::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// An error ready to be sent to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
                kind,
            },
        }
    }

    pub fn bad_request(kind: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, kind, message)
    }
}

pub fn status_for(err: &SessionError) -> StatusCode {
    match err {
        SessionError::ProviderMissing => StatusCode::SERVICE_UNAVAILABLE,
        SessionError::UserRejected | SessionError::NoAccounts => StatusCode::FORBIDDEN,
        SessionError::NotConnected
        | SessionError::AlreadyConnected
        | SessionError::AlreadyConnecting
        | SessionError::SendInProgress
        | SessionError::Cancelled { .. } => StatusCode::CONFLICT,
        SessionError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
        SessionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        SessionError::ChainUnrecognized(_)
        | SessionError::ChainSwitchOther(_)
        | SessionError::TransactionFailed(_)
        | SessionError::QueryFailed(_)
        | SessionError::Wallet(_) => StatusCode::BAD_GATEWAY,
        SessionError::Storage(_) | SessionError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        Self::new(status_for(&err), err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
