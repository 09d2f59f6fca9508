//! HTTP server for helpdeskd

use crate::routes;
use crate::sessions::SessionRegistry;
use anyhow::Result;
use axum::Router;
use helpdesk_common::Dialogue;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub dialogue: Dialogue,
    pub sessions: SessionRegistry,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(dialogue: Dialogue) -> Self {
        Self::with_sessions(dialogue, SessionRegistry::new())
    }

    pub fn with_sessions(dialogue: Dialogue, sessions: SessionRegistry) -> Self {
        Self {
            dialogue,
            sessions,
            start_time: Instant::now(),
        }
    }
}

/// Build the router without binding (used by tests).
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C.
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down gracefully");
    }
}
