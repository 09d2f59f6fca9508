//! CSV ingestion for the knowledge base.
//!
//! A missing or unreadable file never fails startup: the caller gets an empty
//! knowledge base and a [`LoadWarning::SourceUnavailable`]. Cells that are not
//! valid UTF-8 are read as Latin-1, the usual encoding of spreadsheet exports.

use super::{KnowledgeBase, KnowledgeEntry, LoadWarning};
use crate::error::HelpdeskError;
use crate::normalize::normalize;
use csv_async::{AsyncReaderBuilder, ByteRecord};
use std::path::Path;
use tokio::io::AsyncRead;
use tracing::{info, warn};

const QUESTION_ALIASES: &[&str] = &["question", "pregunta"];
const ANSWER_ALIASES: &[&str] = &["answer", "respuesta"];
const SYNONYM_ALIASES: &[&str] = &["synonyms", "sinonimos"];

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct Columns {
    question: Option<usize>,
    answer: Option<usize>,
    synonyms: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String]) -> Self {
        let find = |aliases: &[&str]| {
            headers
                .iter()
                .position(|h| aliases.contains(&normalize(h).as_str()))
        };
        Self {
            question: find(QUESTION_ALIASES),
            answer: find(ANSWER_ALIASES),
            synonyms: find(SYNONYM_ALIASES),
        }
    }

    fn missing(&self) -> Vec<String> {
        [
            (self.question, "Question"),
            (self.answer, "Answer"),
            (self.synonyms, "Synonyms"),
        ]
        .iter()
        .filter(|(idx, _)| idx.is_none())
        .map(|(_, name)| name.to_string())
        .collect()
    }

    fn cell(record: &[String], idx: Option<usize>) -> &str {
        idx.and_then(|i| record.get(i)).map(String::as_str).unwrap_or("")
    }
}

/// Decode every cell; `true` if any of them needed the Latin-1 fallback.
fn decode_record(record: &ByteRecord) -> (Vec<String>, bool) {
    let mut latin1 = false;
    let cells = record
        .iter()
        .map(|cell| match std::str::from_utf8(cell) {
            Ok(text) => text.to_string(),
            Err(_) => {
                latin1 = true;
                cell.iter().map(|&b| char::from(b)).collect()
            }
        })
        .collect();
    (cells, latin1)
}

/// Read rows from any CSV stream. Absent columns read as empty cells.
pub async fn load_from_reader<R>(
    reader: R,
) -> Result<(Vec<KnowledgeEntry>, Vec<LoadWarning>), HelpdeskError>
where
    R: AsyncRead + Unpin + Send,
{
    let mut csv = AsyncReaderBuilder::new()
        .flexible(true)
        .create_reader(reader);

    let (headers, _) = decode_record(csv.byte_headers().await?);
    let columns = Columns::resolve(&headers);
    let mut warnings = Vec::new();
    let missing = columns.missing();
    if !missing.is_empty() {
        warnings.push(LoadWarning::MissingColumns(missing));
    }

    let mut entries = Vec::new();
    let mut record = ByteRecord::new();
    while csv.read_byte_record(&mut record).await? {
        let (cells, latin1) = decode_record(&record);
        if latin1 {
            warnings.push(LoadWarning::Latin1Row {
                row: entries.len() + 1,
            });
        }
        entries.push(KnowledgeEntry::from_cells(
            Columns::cell(&cells, columns.question),
            Columns::cell(&cells, columns.answer),
            Columns::cell(&cells, columns.synonyms),
        ));
    }

    Ok((entries, warnings))
}

async fn read_file(path: &Path) -> Result<(Vec<KnowledgeEntry>, Vec<LoadWarning>), HelpdeskError> {
    let file = tokio::fs::File::open(path).await?;
    load_from_reader(file).await
}

/// Load and index a CSV knowledge file.
pub async fn load_from_path(path: impl AsRef<Path>) -> (KnowledgeBase, Vec<LoadWarning>) {
    let path = path.as_ref();

    let (entries, mut warnings) = match read_file(path).await {
        Ok(loaded) => loaded,
        Err(e) => {
            let warning = LoadWarning::SourceUnavailable {
                source: path.display().to_string(),
                reason: e.to_string(),
            };
            warn!("{}", warning);
            return (KnowledgeBase::new(), vec![warning]);
        }
    };

    let (kb, index_warnings) = KnowledgeBase::from_entries(entries);
    warnings.extend(index_warnings);

    for warning in &warnings {
        warn!("{}", warning);
    }
    info!(
        "Knowledge base loaded from {}: {} keys, {} synonyms",
        path.display(),
        kb.len(),
        kb.synonym_count()
    );

    (kb, warnings)
}
