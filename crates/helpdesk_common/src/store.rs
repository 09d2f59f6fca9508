//! Conversation archive.
//!
//! Ended sessions are written as one pretty-printed JSON document per
//! conversation: `<dir>/conversacion_<YYYYmmdd_HHMMSS>.json`.

use crate::error::HelpdeskError;
use crate::session::Session;
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};

/// Default archive directory, relative to the working directory.
pub const DEFAULT_CONVERSATION_DIR: &str = "conversaciones";

/// Destination for ended conversations.
pub trait ConversationStore: Send + Sync {
    /// Persist the full record and return its identifier.
    fn persist(&self, session: &Session) -> Result<String, HelpdeskError>;
}

/// JSON files in a directory, created on first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open a fresh file for `stamp`, suffixing `_2`, `_3`... on collision.
    fn create_unique(&self, stamp: &str) -> Result<(PathBuf, fs::File), HelpdeskError> {
        let mut attempt = 1;
        loop {
            let name = if attempt == 1 {
                format!("conversacion_{}.json", stamp)
            } else {
                format!("conversacion_{}_{}.json", stamp, attempt)
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Write `content` to the freshly created `path`, deleting it if the write fails.
fn write_or_discard<W: Write>(path: &Path, mut out: W, content: &[u8]) -> Result<(), HelpdeskError> {
    let written = out.write_all(content).and_then(|_| out.flush());
    if let Err(e) = written {
        drop(out);
        if let Err(remove_err) = fs::remove_file(path) {
            warn!("Could not remove partial archive {}: {}", path.display(), remove_err);
        }
        return Err(e.into());
    }
    Ok(())
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSATION_DIR)
    }
}

impl ConversationStore for FileStore {
    fn persist(&self, session: &Session) -> Result<String, HelpdeskError> {
        fs::create_dir_all(&self.dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let content = serde_json::to_string_pretty(session)?;
        let (path, file) = self.create_unique(&stamp)?;
        write_or_discard(&path, file, content.as_bytes())?;

        info!("Conversation saved to {}", path.display());
        Ok(path.display().to_string())
    }
}

/// In-memory archive for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far.
    pub fn records(&self) -> Vec<Session> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConversationStore for MemoryStore {
    fn persist(&self, session: &Session) -> Result<String, HelpdeskError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| HelpdeskError::Store("memory store poisoned".to_string()))?;
        records.push(session.clone());
        Ok(format!("memory:{}", records.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Message;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_creates_dir_and_writes_json() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("conversaciones");
        let store = FileStore::new(&dir);

        let mut session = Session::new();
        session.customer_name = Some("José".to_string());
        session.push(Message::user("Adiós"));

        let id = store.persist(&session).unwrap();
        assert!(dir.is_dir());

        let path = PathBuf::from(&id);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("conversacion_") && name.ends_with(".json"));

        let content = fs::read_to_string(&path).unwrap();
        // Non-ASCII stays readable
        assert!(content.contains("José"));
        assert!(content.contains("\"usuario\": \"Adiós\""));
    }

    #[test]
    fn test_file_store_never_overwrites() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        let session = Session::new();

        let first = store.persist(&session).unwrap();
        let second = store.persist(&session).unwrap();
        assert_ne!(first, second);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 2);
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("conversacion_20250101_120000.json");
        fs::write(&path, "").unwrap();

        let err = write_or_discard(&path, BrokenWriter, b"{}").unwrap_err();
        assert!(matches!(err, HelpdeskError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        store.persist(&Session::new()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.records().len(), 1);
    }
}
