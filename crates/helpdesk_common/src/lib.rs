//! Shared helpdesk engine: knowledge base, matcher, commands and dialogue.

pub mod commands;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod knowledge;
pub mod matcher;
pub mod normalize;
pub mod session;
pub mod similarity;
pub mod store;

pub use commands::{dispatch, Command};
pub use config::Config;
pub use dialogue::{Dialogue, FALLBACK_RESPONSE, FAREWELL_RESPONSE};
pub use error::{HelpdeskError, SessionFieldError};
pub use knowledge::{KnowledgeBase, KnowledgeEntry, LoadWarning};
pub use matcher::{Match, MatchKind, Matcher};
pub use normalize::normalize;
pub use session::{Message, Session, SessionFields, Speaker};
pub use store::{ConversationStore, FileStore, MemoryStore};
