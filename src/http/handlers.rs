//! Request handlers, one per controller operation.

use alloy::primitives::Address;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Serialize;

use crate::cooldown::CooldownStatus;
use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::session::{Dashboard, SendReceipt};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub address: Address,
    pub dashboard: Dashboard,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

#[derive(Debug, Serialize)]
pub struct CooldownResponse {
    pub address: Address,
    #[serde(flatten)]
    pub status: CooldownStatus,
    pub text: String,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "ok",
    })
}

pub async fn get_status(State(state): State<AppState>) -> Json<Dashboard> {
    Json(Dashboard::clone(&state.controller.snapshot()))
}

pub async fn connect(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<ConnectResponse>, ApiError> {
    tracing::debug!(request_id = %request_id(&headers), "Connect requested");
    let address = state.controller.connect().await?;
    Ok(Json(ConnectResponse {
        address,
        dashboard: Dashboard::clone(&state.controller.snapshot()),
    }))
}

pub async fn disconnect(State(state): State<AppState>, headers: HeaderMap) -> Json<DisconnectResponse> {
    tracing::debug!(request_id = %request_id(&headers), "Disconnect requested");
    Json(DisconnectResponse {
        disconnected: state.controller.disconnect().await,
    })
}

pub async fn send(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<SendReceipt>, ApiError> {
    tracing::debug!(request_id = %request_id(&headers), "Send requested");
    Ok(Json(state.controller.send_greeting().await?))
}

pub async fn refresh(State(state): State<AppState>) -> Result<Json<Dashboard>, ApiError> {
    let dashboard = state.controller.refresh_now().await?;
    Ok(Json(Dashboard::clone(&dashboard)))
}

pub async fn cooldown(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<CooldownResponse>, ApiError> {
    let address: Address = address
        .parse()
        .map_err(|e| ApiError::bad_request("invalid_address", format!("invalid address {:?}: {}", address, e)))?;

    let status = state.controller.cooldown_status(&address)?;
    Ok(Json(CooldownResponse {
        address,
        status,
        text: status.describe(),
    }))
}
