//! Dialogue controller: the single entry point for an inbound message.
//!
//! Order of precedence for each message:
//! 1. literal menu command on the raw text
//! 2. exit phrase on the normalized text (archives the session)
//! 3. knowledge-base match
//! 4. fallback pointing at the menu

use crate::commands;
use crate::knowledge::KnowledgeBase;
use crate::matcher::Matcher;
use crate::normalize::normalize;
use crate::session::{Message, Session, SessionFields};
use crate::store::ConversationStore;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Normalized phrases that end the conversation.
pub const EXIT_PHRASES: &[&str] = &["adios", "chao"];

pub const FAREWELL_RESPONSE: &str = "👋 ¡Gracias por contactarnos! Esperamos haberte ayudado.";

pub const FALLBACK_RESPONSE: &str = "Lo siento, no entiendo tu consulta. ¿Podrías reformularla? \
     Recuerda que puedes presionar '1' para ver el menú de opciones.";

/// True if `raw` normalizes to an exit phrase.
pub fn is_exit_phrase(raw: &str) -> bool {
    EXIT_PHRASES.contains(&normalize(raw).as_str())
}

/// Shared, read-only responder. Sessions are passed in per call.
#[derive(Clone)]
pub struct Dialogue {
    knowledge: Arc<KnowledgeBase>,
    matcher: Matcher,
    store: Arc<dyn ConversationStore>,
}

impl Dialogue {
    pub fn new(knowledge: Arc<KnowledgeBase>, store: Arc<dyn ConversationStore>) -> Self {
        Self {
            knowledge,
            matcher: Matcher::default(),
            store,
        }
    }

    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Merge host-supplied customer fields into the session.
    pub fn initialize_session(&self, session: &mut Session, fields: SessionFields) {
        session.apply_fields(fields);
        debug!(
            "Session initialized (name set: {}, service number set: {})",
            session.customer_name.is_some(),
            session.service_number.is_some()
        );
    }

    /// Log the message, compute the response, log the response.
    ///
    /// An ended session is already archived: it is left untouched and every
    /// further message gets the farewell.
    pub fn process_message(&self, session: &mut Session, raw: &str) -> String {
        if session.is_ended() {
            debug!("Message on ended session ignored");
            return FAREWELL_RESPONSE.to_string();
        }

        session.push(Message::user(raw));

        let response = self.respond(session, raw);

        session.push(Message::bot(response.clone()));
        response
    }

    fn respond(&self, session: &mut Session, raw: &str) -> String {
        if let Some(response) = commands::dispatch(raw, session) {
            debug!("Command {:?}", raw);
            return response;
        }

        let key = normalize(raw);

        if EXIT_PHRASES.contains(&key.as_str()) {
            self.end_session(session);
            return FAREWELL_RESPONSE.to_string();
        }

        match self.matcher.find(&key, &self.knowledge) {
            Some(found) => {
                debug!("{} match on {:?} ({:.3})", found.kind, found.key, found.score);
                found.answer.to_string()
            }
            None => FALLBACK_RESPONSE.to_string(),
        }
    }

    /// Archive the record as it stands (exit phrase included) and mark it ended.
    fn end_session(&self, session: &mut Session) {
        match self.store.persist(session) {
            Ok(id) => info!("Conversation ended, archived as {}", id),
            Err(e) => error!("Failed to archive conversation: {}", e),
        }
        session.mark_ended();
    }
}
