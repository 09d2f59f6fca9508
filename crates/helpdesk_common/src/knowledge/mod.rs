//! Knowledge base: question/answer/synonym triples indexed by normalized key.
//!
//! Built once at startup and read-only afterwards. Two maps are kept:
//! - `answers`: every question key and every synonym key -> answer text
//! - `synonyms`: synonym key -> canonical question key (diagnostics only)
//!
//! Both are insertion ordered. When a later row normalizes to a key that is
//! already present the later answer wins but the key keeps its original
//! position, which is the order the matcher uses to break ties.

pub mod loader;

use crate::normalize::normalize;
use indexmap::IndexMap;
use std::fmt;

pub use loader::{load_from_path, load_from_reader};

/// Answer text stored for rows whose Answer cell is empty.
pub const MISSING_ANSWER: &str = "nan";

/// One source row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
    pub synonyms: Vec<String>,
}

impl KnowledgeEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            synonyms: Vec::new(),
        }
    }

    /// Build from raw cells; `synonyms` is the comma-separated cell.
    pub fn from_cells(question: &str, answer: &str, synonyms: &str) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            synonyms: split_synonyms(synonyms),
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }
}

/// Split a synonyms cell on commas, dropping blank pieces.
pub fn split_synonyms(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Non-fatal problem found while loading. Rows are numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// File missing or table unreadable; the knowledge base is empty
    SourceUnavailable { source: String, reason: String },
    /// Required columns absent from the header; treated as empty
    MissingColumns(Vec<String>),
    /// Question or synonym normalized to nothing and was not indexed
    EmptyKey { row: usize, text: String },
    /// Key already present with a different answer; the later row won
    DuplicateKey { row: usize, key: String },
    /// Row was not valid UTF-8 and was decoded as Latin-1
    Latin1Row { row: usize },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceUnavailable { source, reason } => {
                write!(f, "knowledge source {} unavailable: {}", source, reason)
            }
            Self::MissingColumns(columns) => {
                write!(f, "missing columns, treated as empty: {}", columns.join(", "))
            }
            Self::EmptyKey { row, text } => {
                write!(f, "row {}: {:?} normalizes to an empty key", row, text)
            }
            Self::DuplicateKey { row, key } => {
                write!(f, "row {}: key {:?} overwrites an earlier answer", row, key)
            }
            Self::Latin1Row { row } => {
                write!(f, "row {}: not valid UTF-8, decoded as Latin-1", row)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    answers: IndexMap<String, String>,
    synonyms: IndexMap<String, String>,
}

impl KnowledgeBase {
    /// Empty knowledge base; every query misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index rows in order. Later rows overwrite earlier ones on key collision.
    pub fn from_entries<I>(entries: I) -> (Self, Vec<LoadWarning>)
    where
        I: IntoIterator<Item = KnowledgeEntry>,
    {
        let mut kb = Self::new();
        let mut warnings = Vec::new();
        for (idx, entry) in entries.into_iter().enumerate() {
            kb.insert_entry(idx + 1, entry, &mut warnings);
        }
        (kb, warnings)
    }

    fn insert_entry(&mut self, row: usize, entry: KnowledgeEntry, warnings: &mut Vec<LoadWarning>) {
        let question = entry.question.trim();
        if question.is_empty() {
            return;
        }

        let q_key = normalize(question);
        if q_key.is_empty() {
            warnings.push(LoadWarning::EmptyKey {
                row,
                text: question.to_string(),
            });
            return;
        }

        let answer = if entry.answer.is_empty() {
            MISSING_ANSWER.to_string()
        } else {
            entry.answer
        };

        self.insert_answer(row, q_key.clone(), &answer, warnings);

        for synonym in &entry.synonyms {
            let synonym = synonym.trim();
            if synonym.is_empty() {
                continue;
            }
            let syn_key = normalize(synonym);
            if syn_key.is_empty() {
                warnings.push(LoadWarning::EmptyKey {
                    row,
                    text: synonym.to_string(),
                });
                continue;
            }
            self.synonyms.insert(syn_key.clone(), q_key.clone());
            self.insert_answer(row, syn_key, &answer, warnings);
        }
    }

    fn insert_answer(&mut self, row: usize, key: String, answer: &str, warnings: &mut Vec<LoadWarning>) {
        if let Some(previous) = self.answers.get(&key) {
            if previous != answer {
                warnings.push(LoadWarning::DuplicateKey {
                    row,
                    key: key.clone(),
                });
            }
        }
        // IndexMap::insert keeps the original slot for an existing key
        self.answers.insert(key, answer.to_string());
    }

    /// Answer stored under an already-normalized key.
    pub fn answer(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    /// Stored key and answer for an already-normalized key.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.answers
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical question key a synonym key resolves to.
    pub fn canonical_question(&self, synonym_key: &str) -> Option<&str> {
        self.synonyms.get(synonym_key).map(String::as_str)
    }

    /// `(key, answer)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.answers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(synonym key, question key)` pairs in insertion order.
    pub fn synonyms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.synonyms.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of answer keys (questions and synonyms).
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn synonym_count(&self) -> usize {
        self.synonyms.len()
    }
}
