//! API routes for helpdeskd
//!
//! `POST /chat` takes either an init payload (`"type": "init"` plus
//! `userData`) or a message. `GET /v1/health` reports knowledge-base size.

use crate::server::AppState;
use crate::sessions::DEFAULT_SESSION_ID;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use helpdesk_common::SessionFields;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Chat Routes
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// "init" for session setup; anything else is a message
    #[serde(rename = "type", default)]
    pub kind: Option<String>,

    #[serde(rename = "userData", default)]
    pub user_data: Option<SessionFields>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub session_id: Option<String>,
}

impl ChatRequest {
    fn is_init(&self) -> bool {
        self.kind.as_deref() == Some("init")
    }

    fn session_id(&self) -> &str {
        self.session_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitResponse {
    pub status: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub response: String,
    pub session_id: String,
}

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    let session_id = req.session_id().to_string();

    if req.is_init() {
        let (_, mut session) = state.sessions.lock_active(&session_id).await;
        let fields = req.user_data.clone().unwrap_or_default();
        state.dialogue.initialize_session(&mut session, fields);
        info!("  Session {} initialized", session_id);

        return Ok(Json(InitResponse {
            status: "ok".to_string(),
            session_id,
        })
        .into_response());
    }

    let Some(message) = req.message else {
        warn!("  Chat request without message for session {}", session_id);
        return Err((StatusCode::BAD_REQUEST, "missing 'message'".to_string()));
    };

    let (shared, mut session) = state.sessions.lock_active(&session_id).await;

    // Full-scan matching and the archive write both block
    let dialogue = state.dialogue.clone();
    let (response, ended) = tokio::task::spawn_blocking(move || {
        let response = dialogue.process_message(&mut session, &message);
        (response, session.is_ended())
    })
    .await
    .map_err(|e| {
        error!("  Chat worker failed for session {}: {}", session_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, "chat worker failed".to_string())
    })?;

    if ended {
        state.sessions.remove(&session_id, &shared).await;
        info!("  Session {} ended", session_id);
    }

    Ok(Json(MessageResponse {
        response,
        session_id,
    })
    .into_response())
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub knowledge_keys: usize,
    pub synonyms: usize,
    pub active_sessions: usize,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/v1/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let kb = state.dialogue.knowledge();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        knowledge_keys: kb.len(),
        synonyms: kb.synonym_count(),
        active_sessions: state.sessions.len().await,
    })
}
