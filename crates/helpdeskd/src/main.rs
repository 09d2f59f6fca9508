//! Helpdesk Daemon - chat relay for the FAQ responder
//!
//! Loads the knowledge base once, then serves `POST /chat` with one session
//! per client-supplied session id.

use anyhow::Result;
use helpdesk_common::knowledge::load_from_path;
use helpdesk_common::{Config, Dialogue, FileStore, Matcher};
use helpdeskd::server::{self, AppState};
use helpdeskd::sessions::SessionRegistry;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Helpdesk Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load(None)?;

    let (knowledge, warnings) = load_from_path(&config.knowledge.path).await;
    if !warnings.is_empty() {
        warn!("Knowledge base loaded with {} warning(s)", warnings.len());
    }
    info!(
        "Knowledge base ready: {} keys, {} synonyms",
        knowledge.len(),
        knowledge.synonym_count()
    );

    let store = FileStore::new(&config.conversations.dir);
    info!("  Conversations archived under {}", store.dir().display());

    let dialogue = Dialogue::new(Arc::new(knowledge), Arc::new(store))
        .with_matcher(Matcher::new(config.matcher.cutoff));

    let sessions =
        SessionRegistry::with_idle_timeout(Duration::from_secs(config.server.session_idle_secs));
    info!(
        "  Idle sessions expire after {}s",
        config.server.session_idle_secs
    );

    server::run(AppState::with_sessions(dialogue, sessions), &config.server.bind).await
}
