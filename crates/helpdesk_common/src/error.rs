//! Error types for the helpdesk.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelpdeskError {
    #[error("Conversation store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HelpdeskError {
    pub fn code(&self) -> i32 {
        match self {
            HelpdeskError::Store(_) => -32002,
            HelpdeskError::Config(_) => -32003,
            HelpdeskError::Csv(_) => -32004,
            HelpdeskError::Io(_) => -32006,
            HelpdeskError::Json(_) => -32700,
        }
    }
}

/// Rejected customer field during interactive setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionFieldError {
    #[error("name must be longer than {min} characters")]
    NameTooShort { min: usize },

    #[error("phone must contain digits only")]
    PhoneNotNumeric,

    #[error("phone must have at least {min} digits")]
    PhoneTooShort { min: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            HelpdeskError::Store(String::new()),
            HelpdeskError::Config(String::new()),
            HelpdeskError::Io(std::io::Error::other("x")),
        ];
        let mut codes: Vec<i32> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_field_error_messages() {
        assert_eq!(
            SessionFieldError::PhoneTooShort { min: 7 }.to_string(),
            "phone must have at least 7 digits"
        );
    }
}
