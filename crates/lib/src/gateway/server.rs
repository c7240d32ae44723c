//! Gateway HTTP server: routes, shared state, startup and graceful shutdown.

use crate::config::{self, Config};
use crate::gateway::{callback, push};
use crate::line::{LineClient, MessagingApi};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared state for the handlers. Read-only: each request gets a clone.
#[derive(Clone)]
pub struct RelayState {
    pub config: Arc<Config>,
    /// Channel secret used to verify webhook signatures.
    pub channel_secret: Arc<str>,
    /// The one messaging client handle shared by both handlers.
    pub messaging: Arc<dyn MessagingApi>,
}

impl RelayState {
    pub fn new(
        config: Config,
        channel_secret: impl Into<Arc<str>>,
        messaging: Arc<dyn MessagingApi>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            channel_secret: channel_secret.into(),
            messaging,
        }
    }
}

/// Build the router: /push_message (GET probe, POST push), /callback (webhook) and GET /.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route(
            "/push_message",
            get(push::push_ping).post(push::push_message),
        )
        .route("/callback", post(callback::callback))
        .with_state(state)
}

/// Resolve credentials, build the LINE client and serve until SIGINT/SIGTERM.
/// Fails before binding when the channel secret or access token is missing.
pub async fn run_gateway(config: Config) -> Result<()> {
    let credentials = config::resolve_credentials(&config)?;
    let messaging: Arc<dyn MessagingApi> = Arc::new(LineClient::new(
        &config.line.api_base,
        credentials.channel_access_token,
    ));
    log::info!("messaging api base: {}", config.line.api_base);

    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let state = RelayState::new(config, credentials.channel_secret, messaging);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("relay listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("relay server exited")?;
    log::info!("relay stopped");
    Ok(())
}

/// Completes on SIGINT or SIGTERM. In-flight requests are drained by axum afterwards.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<RelayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.server.port,
    }))
}
