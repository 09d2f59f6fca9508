//! End-to-end conversation tests against a CSV knowledge base.
//!
//! Scores quoted in comments are gestalt-pattern ratios of stored key vs query.

use helpdesk_common::knowledge::{load_from_path, LoadWarning};
use helpdesk_common::{
    normalize, Dialogue, FileStore, KnowledgeBase, MemoryStore, Session, Speaker,
    FALLBACK_RESPONSE, FAREWELL_RESPONSE,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

const TWO_ROW_KB: &str = "Pregunta,Respuesta,Sinonimos\n\
mi computadora esta lenta,Reinicia tu equipo,\"pc lenta, equipo lento\"\n\
no prende,Revisa el cable de poder,\n";

async fn load_kb(dir: &Path, content: &str) -> KnowledgeBase {
    let path = dir.join("preguntas_respuestas.csv");
    fs::write(&path, content).unwrap();
    let (kb, warnings) = load_from_path(&path).await;
    assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    kb
}

#[tokio::test]
async fn test_two_row_scenario() {
    let tmp = TempDir::new().unwrap();
    let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
    assert_eq!(kb.len(), 4);
    assert_eq!(kb.synonym_count(), 2);

    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(MemoryStore::new()));
    let mut session = Session::new();

    // 0.7317 against "mi computadora esta lenta", 0.6667 against "pc lenta"
    assert_eq!(
        dialogue.process_message(&mut session, "mi pc esta lenta"),
        "Reinicia tu equipo"
    );
    // 0.70 against "no prende"
    assert_eq!(
        dialogue.process_message(&mut session, "no enciende"),
        "Revisa el cable de poder"
    );
    assert_eq!(session.messages.len(), 4);
}

#[tokio::test]
async fn test_pinned_scores_for_scenario() {
    let tmp = TempDir::new().unwrap();
    let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(MemoryStore::new()));

    let slow = dialogue.matcher().find("mi pc esta lenta", dialogue.knowledge()).unwrap();
    assert_eq!(slow.key, "mi computadora esta lenta");
    assert!((slow.score - 30.0 / 41.0).abs() < 1e-9);

    let dead = dialogue.matcher().find("no enciende", dialogue.knowledge()).unwrap();
    assert_eq!(dead.key, "no prende");
    assert!((dead.score - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn test_synonym_transitivity() {
    let tmp = TempDir::new().unwrap();
    let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(MemoryStore::new()));
    let matcher = dialogue.matcher();
    let kb = dialogue.knowledge();

    let canonical = matcher.answer(&normalize("mi computadora esta lenta"), kb);
    assert!(canonical.is_some());
    for synonym in ["PC lenta", "equipo lento"] {
        assert_eq!(matcher.answer(&normalize(synonym), kb), canonical);
    }
}

#[tokio::test]
async fn test_command_precedence() {
    let tmp = TempDir::new().unwrap();
    let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(MemoryStore::new()));
    let mut session = Session::new();

    let menu = dialogue.process_message(&mut session, "1");
    assert!(menu.starts_with("📋 Menú Principal:"));

    // Word form is not a command and matches nothing
    assert_eq!(dialogue.process_message(&mut session, "uno"), FALLBACK_RESPONSE);

    session.service_number = Some("A-77".to_string());
    assert_eq!(dialogue.process_message(&mut session, "1"), menu);
}

#[tokio::test]
async fn test_exit_phrase_persists_once() {
    for farewell in ["Adiós", "Adios", "CHAO"] {
        let tmp = TempDir::new().unwrap();
        let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
        let store = Arc::new(MemoryStore::new());
        let dialogue = Dialogue::new(Arc::new(kb), store.clone());
        let mut session = Session::new();

        dialogue.process_message(&mut session, "no prende");
        dialogue.process_message(&mut session, "4");
        assert!(store.is_empty());

        assert_eq!(dialogue.process_message(&mut session, farewell), FAREWELL_RESPONSE);
        assert!(session.is_ended());

        let records = store.records();
        assert_eq!(records.len(), 1, "exactly one record for {:?}", farewell);
        let saved = &records[0];
        // Two exchanges plus the exit phrase itself
        assert_eq!(saved.messages.len(), 5);
        assert_eq!(saved.messages[0].text(), "no prende");
        assert_eq!(saved.messages[1].text(), "Revisa el cable de poder");
        assert_eq!(saved.messages[4].speaker(), Speaker::User);
        assert_eq!(saved.messages[4].text(), farewell);

        // The live session also logs the farewell
        assert_eq!(session.messages.len(), 6);
        assert_eq!(session.messages[5].text(), FAREWELL_RESPONSE);
    }
}

#[tokio::test]
async fn test_exit_phrase_writes_archive_file() {
    let tmp = TempDir::new().unwrap();
    let kb = load_kb(tmp.path(), TWO_ROW_KB).await;
    let archive = tmp.path().join("conversaciones");
    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(FileStore::new(&archive)));
    let mut session = Session::new();
    session.customer_name = Some("Marta Gómez".to_string());

    dialogue.process_message(&mut session, "mi pc esta lenta");
    dialogue.process_message(&mut session, "Adiós");

    let files: Vec<_> = fs::read_dir(&archive).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(files.len(), 1);

    let record: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(record["nombre_cliente"], "Marta Gómez");
    assert!(record["telefono"].is_null());
    assert_eq!(record["mensajes"].as_array().unwrap().len(), 3);
    assert_eq!(record["mensajes"][1]["bot"], "Reinicia tu equipo");
    assert_eq!(record["mensajes"][2]["usuario"], "Adiós");
}

#[tokio::test]
async fn test_missing_source_still_answers() {
    let tmp = TempDir::new().unwrap();
    let (kb, warnings) = load_from_path(tmp.path().join("no_such.csv")).await;
    assert!(kb.is_empty());
    assert!(matches!(warnings.as_slice(), [LoadWarning::SourceUnavailable { .. }]));

    let dialogue = Dialogue::new(Arc::new(kb), Arc::new(MemoryStore::new()));
    let mut session = Session::new();
    assert_eq!(dialogue.process_message(&mut session, "no prende"), FALLBACK_RESPONSE);
    assert!(dialogue.process_message(&mut session, "7").contains("asesor humano"));
}

#[tokio::test]
async fn test_duplicate_rows_last_wins() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("dup.csv");
    fs::write(
        &path,
        "Pregunta,Respuesta,Sinonimos\nNo prende,vieja,\nNO PRENDE!,nueva,\n",
    )
    .unwrap();

    let (kb, warnings) = load_from_path(&path).await;
    assert_eq!(kb.answer("no prende"), Some("nueva"));
    assert_eq!(
        warnings,
        vec![LoadWarning::DuplicateKey {
            row: 2,
            key: "no prende".to_string()
        }]
    );
}
