//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with one route per controller operation
//! - Wire up middleware (tracing, timeout, request ID)
//! - Serve until the shutdown future resolves

use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::handlers;
use crate::http::request::X_REQUEST_ID;
use crate::session::SessionController;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
}

/// HTTP front end of the dashboard daemon.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(controller: Arc<SessionController>, config: &ServerConfig) -> Self {
        let state = AppState { controller };
        let router = Self::build_router(state, Duration::from_secs(config.request_timeout_secs));
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/status", get(handlers::get_status))
            .route("/api/connect", post(handlers::connect))
            .route("/api/disconnect", post(handlers::disconnect))
            .route("/api/send", post(handlers::send))
            .route("/api/refresh", post(handlers::refresh))
            .route("/api/cooldown/{address}", get(handlers::cooldown))
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
