use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::SessionStore;
use crate::types::{Turn, TurnRole};

/// On-disk shape: ordered `{role, content}` pairs — exactly what round-trips
/// into the LLM message format.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTurn {
    role: TurnRole,
    content: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionDoc {
    messages: Vec<StoredTurn>,
}

/// Durable session store: one JSON file per session under a data directory.
///
/// Opt-in alternative to [`super::MemorySessionStore`]. I/O failures are
/// logged and degrade to an empty read or a dropped write; they never reach
/// the caller. A single mutex serializes the read-modify-write cycles.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
    max_turns: usize,
    ttl_secs: u64,
    write_guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>, max_turns: usize, ttl_secs: u64) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!(error = %e, dir = %dir.display(), "could not create session data dir");
        }
        Self { dir, max_turns, ttl_secs, write_guard: Mutex::new(()) }
    }

    /// Strip everything but alphanumerics, `-` and `_` from a session id.
    fn safe_name(session_id: &str) -> String {
        session_id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    }

    fn path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", Self::safe_name(session_id)))
    }

    fn load(path: &Path) -> SessionDoc {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "corrupt session file — starting fresh");
                SessionDoc::default()
            }),
            Err(_) => SessionDoc::default(),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn history(&self, session_id: &str) -> Vec<Turn> {
        let doc = Self::load(&self.path(session_id));
        doc.messages
            .into_iter()
            .map(|m| Turn::new(m.role, m.content))
            .collect()
    }

    fn append(&self, session_id: &str, role: TurnRole, content: &str) {
        if content.trim().is_empty() {
            return;
        }
        let path = self.path(session_id);
        let _guard = self.write_guard.lock();

        let mut doc = Self::load(&path);
        doc.messages.push(StoredTurn { role, content: content.to_owned() });
        while doc.messages.len() > self.max_turns {
            doc.messages.remove(0);
        }

        match serde_json::to_string_pretty(&doc) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    tracing::warn!(error = %e, session = %session_id, "session write dropped");
                }
            }
            Err(e) => tracing::warn!(error = %e, session = %session_id, "session serialize dropped"),
        }
    }

    fn evict_expired(&self) {
        let Ok(entries) = std::fs::read_dir(&self.dir) else {
            return;
        };
        let ttl = std::time::Duration::from_secs(self.ttl_secs);
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let expired = entry
                .metadata()
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| t.elapsed().ok())
                .map(|age| age > ttl)
                .unwrap_or(false);
            if expired {
                if let Err(e) = std::fs::remove_file(&path) {
                    tracing::warn!(error = %e, path = %path.display(), "expired session removal failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_name_strips_path_tricks() {
        assert_eq!(FileSessionStore::safe_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(FileSessionStore::safe_name("user-1_a"), "user-1_a");
        assert_eq!(FileSessionStore::safe_name("a b;c"), "abc");
    }

    #[test]
    fn roundtrip_and_trim() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 3, 3600);

        store.append("s1", TurnRole::User, "one");
        store.append("s1", TurnRole::Assistant, "two");
        store.append("s1", TurnRole::User, "three");
        store.append("s1", TurnRole::Assistant, "four");

        let h = store.history("s1");
        assert_eq!(h.len(), 3);
        assert_eq!(h[0].content, "two");
        assert_eq!(h[2].content, "four");
        assert_eq!(h[2].role, TurnRole::Assistant);
    }

    #[test]
    fn unknown_session_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 3, 3600);
        assert!(store.history("missing").is_empty());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 3, 3600);
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(store.history("bad").is_empty());
        // and appends still work afterwards
        store.append("bad", TurnRole::User, "recovered");
        assert_eq!(store.history("bad").len(), 1);
    }

    #[test]
    fn blank_content_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path(), 3, 3600);
        store.append("s1", TurnRole::User, "  ");
        assert!(store.history("s1").is_empty());
    }
}
