//! Answer lookup: exact key first, then the closest stored key.
//!
//! The approximate pass is a full scan over every key (questions and
//! synonyms) scored with [`similarity::ratio`]. That is fine for an FAQ of a
//! few hundred rows; a larger corpus would want an n-gram index or BK-tree.

use crate::knowledge::KnowledgeBase;
use crate::similarity;
use serde::Serialize;
use tracing::debug;

/// Minimum similarity for an approximate match.
pub const DEFAULT_CUTOFF: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    Approximate,
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Approximate => write!(f, "approximate"),
        }
    }
}

/// A stored key that answered the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match<'kb> {
    pub key: &'kb str,
    pub answer: &'kb str,
    pub score: f64,
    pub kind: MatchKind,
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    cutoff: f64,
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
        }
    }
}

impl Matcher {
    pub fn new(cutoff: f64) -> Self {
        Self { cutoff }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Best match for an already-normalized key, or `None`.
    ///
    /// Ties on score go to the key inserted first.
    pub fn find<'kb>(&self, key: &str, kb: &'kb KnowledgeBase) -> Option<Match<'kb>> {
        if key.is_empty() {
            return None;
        }

        if let Some((stored, answer)) = kb.get_key_value(key) {
            return Some(Match {
                key: stored,
                answer,
                score: 1.0,
                kind: MatchKind::Exact,
            });
        }

        let mut best: Option<(&str, &str, f64)> = None;
        for (candidate, answer) in kb.iter() {
            let score = similarity::ratio(candidate, key);
            if best.map_or(true, |(_, _, top)| score > top) {
                best = Some((candidate, answer, score));
            }
        }

        let (candidate, answer, score) = best?;
        if score < self.cutoff {
            debug!("No match for {:?}: best {:?} at {:.3}", key, candidate, score);
            return None;
        }

        debug!("Approximate match {:?} -> {:?} ({:.3})", key, candidate, score);
        Some(Match {
            key: candidate,
            answer,
            score,
            kind: MatchKind::Approximate,
        })
    }

    /// Answer text only.
    pub fn answer<'kb>(&self, key: &str, kb: &'kb KnowledgeBase) -> Option<&'kb str> {
        self.find(key, kb).map(|m| m.answer)
    }
}
