//! Subcommand implementations.

use crate::chat::Console;
use anyhow::Result;
use helpdesk_common::dialogue::is_exit_phrase;
use helpdesk_common::knowledge::{load_from_path, LoadWarning};
use helpdesk_common::{
    normalize, Command, Config, ConversationStore, Dialogue, FileStore, KnowledgeBase, Matcher,
    MemoryStore,
};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::sync::Arc;

async fn load_knowledge(path: &Path) -> (KnowledgeBase, Vec<LoadWarning>) {
    load_from_path(path).await
}

/// Interactive conversation on stdin/stdout.
pub async fn chat(config: &Config, no_save: bool) -> Result<()> {
    let (knowledge, _) = load_knowledge(&config.knowledge.path).await;

    let store: Arc<dyn ConversationStore> = if no_save {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(&config.conversations.dir))
    };
    let dialogue = Dialogue::new(Arc::new(knowledge), store)
        .with_matcher(Matcher::new(config.matcher.cutoff));

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(&dialogue, &config.bot.name, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}

/// How one message would be routed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub input: String,
    pub normalized: String,
    /// Menu token if the raw text is a command
    pub command: Option<String>,
    pub exit_phrase: bool,
    pub matched_key: Option<String>,
    pub canonical_question: Option<String>,
    pub match_kind: Option<String>,
    pub score: Option<f64>,
    pub answer: Option<String>,
}

pub fn lookup_report(text: &str, knowledge: &KnowledgeBase, matcher: &Matcher) -> LookupReport {
    let normalized = normalize(text);
    let found = matcher.find(&normalized, knowledge);

    LookupReport {
        input: text.to_string(),
        command: Command::parse(text).map(|c| c.token().to_string()),
        exit_phrase: is_exit_phrase(text),
        matched_key: found.as_ref().map(|m| m.key.to_string()),
        canonical_question: found
            .as_ref()
            .and_then(|m| knowledge.canonical_question(m.key))
            .map(String::from),
        match_kind: found.as_ref().map(|m| m.kind.to_string()),
        score: found.as_ref().map(|m| m.score),
        answer: found.map(|m| m.answer.to_string()),
        normalized,
    }
}

pub async fn lookup(config: &Config, text: &str, json: bool) -> Result<()> {
    let (knowledge, _) = load_knowledge(&config.knowledge.path).await;
    let report = lookup_report(text, &knowledge, &Matcher::new(config.matcher.cutoff));

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}  {:?}", "Input:".bold(), report.input);
    println!("{}  {:?}", "Key:  ".bold(), report.normalized);
    if let Some(token) = &report.command {
        println!("{}  menu command {}", "Route:".bold(), token);
    } else if report.exit_phrase {
        println!("{}  exit phrase (conversation would be archived)", "Route:".bold());
    }

    match (&report.matched_key, &report.answer) {
        (Some(key), Some(answer)) => {
            println!(
                "{}  {} {:?} (score {:.3})",
                "Match:".bold(),
                report.match_kind.as_deref().unwrap_or("-"),
                key,
                report.score.unwrap_or_default()
            );
            if let Some(question) = &report.canonical_question {
                println!("{}  synonym of {:?}", "      ".bold(), question);
            }
            println!("{}  {}", "Answer:".green().bold(), answer);
        }
        _ => println!(
            "{}  no entry at or above {:.2}",
            "Match:".yellow().bold(),
            config.matcher.cutoff
        ),
    }

    Ok(())
}

/// Load the knowledge base and print counts and warnings.
///
/// Fails only when the source itself could not be read.
pub async fn check(config: &Config) -> Result<()> {
    let path = &config.knowledge.path;
    let (knowledge, warnings) = load_knowledge(path).await;

    println!("{} {}", "Knowledge base:".bold(), path.display());
    println!("  keys:      {}", knowledge.len());
    println!("  synonyms:  {}", knowledge.synonym_count());

    if warnings.is_empty() {
        println!("{}", "✓ no warnings".green());
    } else {
        println!("{}", format!("⚠ {} warning(s)", warnings.len()).yellow());
        for warning in &warnings {
            println!("  • {}", warning);
        }
    }

    if warnings
        .iter()
        .any(|w| matches!(w, LoadWarning::SourceUnavailable { .. }))
    {
        anyhow::bail!("knowledge source unavailable: {}", path.display());
    }
    Ok(())
}
