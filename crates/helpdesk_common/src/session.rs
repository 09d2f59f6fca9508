//! Conversation session: customer fields plus a flat message log.
//!
//! A `Session` is a plain value owned by the host (daemon registry entry or
//! console loop) and passed into the dialogue for every message.
//!
//! WIRE FORMAT: the serialized record keeps the Spanish field names used by
//! the conversation archive (`nombre_cliente`, `mensajes`, ...).

use crate::error::SessionFieldError;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Names must be longer than this many characters.
pub const MIN_NAME_CHARS: usize = 3;

/// Phones need at least this many digits.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Local wall-clock timestamps as `YYYY-mm-dd HH:MM:SS`.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

fn now() -> NaiveDateTime {
    // Whole seconds, matching the archived format
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// Who said what; serialized as a single `{"usuario": ...}` or `{"bot": ...}` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Utterance {
    #[serde(rename = "usuario")]
    User(String),
    #[serde(rename = "bot")]
    Bot(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub utterance: Utterance,
    #[serde(with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            utterance: Utterance::User(text.into()),
            timestamp: now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            utterance: Utterance::Bot(text.into()),
            timestamp: now(),
        }
    }

    pub fn speaker(&self) -> Speaker {
        match self.utterance {
            Utterance::User(_) => Speaker::User,
            Utterance::Bot(_) => Speaker::Bot,
        }
    }

    pub fn text(&self) -> &str {
        match &self.utterance {
            Utterance::User(text) | Utterance::Bot(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Active,
    /// Exit phrase seen and the record handed to the store
    Ended,
}

/// Customer fields supplied by the host; `None` leaves the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFields {
    #[serde(rename = "nombre_cliente", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "telefono", default)]
    pub phone: Option<String>,
    #[serde(rename = "numero_servicio", default)]
    pub service_number: Option<String>,
    #[serde(rename = "documento", default)]
    pub document: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "nombre_cliente")]
    pub customer_name: Option<String>,
    #[serde(rename = "telefono")]
    pub phone: Option<String>,
    #[serde(rename = "numero_servicio")]
    pub service_number: Option<String>,
    #[serde(rename = "documento")]
    pub document: Option<String>,
    #[serde(rename = "inicio_sesion", with = "timestamp_format")]
    pub started_at: NaiveDateTime,
    #[serde(rename = "mensajes")]
    pub messages: Vec<Message>,
    #[serde(skip)]
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            customer_name: None,
            phone: None,
            service_number: None,
            document: None,
            started_at: now(),
            messages: Vec::new(),
            state: SessionState::Active,
        }
    }

    /// Merge every present field; absent ones keep their value.
    pub fn apply_fields(&mut self, fields: SessionFields) {
        if let Some(name) = fields.customer_name {
            self.customer_name = Some(name);
        }
        if let Some(phone) = fields.phone {
            self.phone = Some(phone);
        }
        if let Some(number) = fields.service_number {
            self.service_number = Some(number);
        }
        if let Some(document) = fields.document {
            self.document = Some(document);
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ended(&self) -> bool {
        self.state == SessionState::Ended
    }

    pub(crate) fn mark_ended(&mut self) {
        self.state = SessionState::Ended;
    }
}

/// Accept a customer name longer than [`MIN_NAME_CHARS`]; returns it trimmed.
pub fn validate_customer_name(raw: &str) -> Result<String, SessionFieldError> {
    let name = raw.trim();
    if name.chars().count() > MIN_NAME_CHARS {
        Ok(name.to_string())
    } else {
        Err(SessionFieldError::NameTooShort { min: MIN_NAME_CHARS })
    }
}

/// Accept an all-digit phone of at least [`MIN_PHONE_DIGITS`]; returns it trimmed.
pub fn validate_phone(raw: &str) -> Result<String, SessionFieldError> {
    let phone = raw.trim();
    if phone.is_empty() || !phone.chars().all(|c| c.is_ascii_digit()) {
        return Err(SessionFieldError::PhoneNotNumeric);
    }
    if phone.len() < MIN_PHONE_DIGITS {
        return Err(SessionFieldError::PhoneTooShort { min: MIN_PHONE_DIGITS });
    }
    Ok(phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_active_and_empty() {
        let session = Session::new();
        assert_eq!(session.state(), SessionState::Active);
        assert!(session.messages.is_empty());
        assert!(session.customer_name.is_none());
    }

    #[test]
    fn test_apply_fields_merges_present_only() {
        let mut session = Session::new();
        session.apply_fields(SessionFields {
            customer_name: Some("Ana Pérez".to_string()),
            phone: Some("3001234567".to_string()),
            ..Default::default()
        });
        session.apply_fields(SessionFields {
            service_number: Some("SRV-9".to_string()),
            ..Default::default()
        });

        assert_eq!(session.customer_name.as_deref(), Some("Ana Pérez"));
        assert_eq!(session.phone.as_deref(), Some("3001234567"));
        assert_eq!(session.service_number.as_deref(), Some("SRV-9"));
        assert!(session.document.is_none());
    }

    #[test]
    fn test_fields_from_init_payload() {
        let json = r#"{"nombre_cliente": "Luis", "telefono": null, "documento": "123"}"#;
        let fields: SessionFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.customer_name.as_deref(), Some("Luis"));
        assert!(fields.phone.is_none());
        assert!(fields.service_number.is_none());
        assert_eq!(fields.document.as_deref(), Some("123"));
    }

    #[test]
    fn test_record_shape() {
        let mut session = Session::new();
        session.push(Message::user("Hola"));
        session.push(Message::bot("¿En qué te ayudo?"));

        let value = serde_json::to_value(&session).unwrap();
        let object = value.as_object().unwrap();
        for key in ["nombre_cliente", "telefono", "numero_servicio", "documento", "inicio_sesion", "mensajes"] {
            assert!(object.contains_key(key), "missing {}", key);
        }
        assert_eq!(value["mensajes"][0]["usuario"], "Hola");
        assert_eq!(value["mensajes"][1]["bot"], "¿En qué te ayudo?");
        let ts = value["mensajes"][0]["timestamp"].as_str().unwrap();
        assert!(NaiveDateTime::parse_from_str(ts, timestamp_format::FORMAT).is_ok());
    }

    #[test]
    fn test_message_accessors() {
        let message = Message::user("no prende");
        assert_eq!(message.speaker(), Speaker::User);
        assert_eq!(message.text(), "no prende");
        assert_eq!(Message::bot("ok").speaker(), Speaker::Bot);
    }

    #[test]
    fn test_validate_customer_name() {
        assert_eq!(validate_customer_name("  María  ").unwrap(), "María");
        assert_eq!(
            validate_customer_name("Ana"),
            Err(SessionFieldError::NameTooShort { min: 3 })
        );
        assert!(validate_customer_name("   ").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone(" 3001234 ").unwrap(), "3001234");
        assert_eq!(validate_phone("300-1234"), Err(SessionFieldError::PhoneNotNumeric));
        assert_eq!(validate_phone(""), Err(SessionFieldError::PhoneNotNumeric));
        assert_eq!(validate_phone("123456"), Err(SessionFieldError::PhoneTooShort { min: 7 }));
    }
}
