//! Router and listener for the dashboard.

use crate::AppState;
use crate::handlers;
use axum::{Router, routing::get};
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::page::index))
        .route("/static/app.js", get(handlers::page::app_js))
        .route("/static/style.css", get(handlers::page::style_css))
        .route("/api/tweets", get(handlers::api::tweets))
        .route("/api/embed", get(handlers::api::embed))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub struct DashboardServer {
    host: String,
    port: u16,
    state: AppState,
}

impl DashboardServer {
    pub fn new(host: impl Into<String>, port: u16, state: AppState) -> Self {
        Self {
            host: host.into(),
            port,
            state,
        }
    }

    /// Bind and serve until the process is stopped.
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid dashboard address: {e}"))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "dashboard.listening");
        axum::serve(listener, router(self.state)).await?;
        Ok(())
    }
}
