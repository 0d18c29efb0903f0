use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use super::SessionStore;
use crate::types::{Turn, TurnRole};

#[derive(Debug)]
struct Session {
    turns: VecDeque<Turn>,
    last_active: DateTime<Utc>,
}

/// In-process session store: one mutex around the whole map.
///
/// The critical sections are a few map operations long and no lock is ever
/// held across an await point, so a single mutex both serializes concurrent
/// appends to the same session id (double-submit safety) and never blocks
/// unrelated lookups behind an in-flight generation.
#[derive(Debug)]
pub struct MemorySessionStore {
    inner: Mutex<HashMap<String, Session>>,
    max_turns: usize,
    ttl_secs: u64,
    capacity: usize,
}

impl MemorySessionStore {
    pub fn new(max_turns: usize, ttl_secs: u64, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_turns,
            ttl_secs,
            capacity,
        }
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.inner.lock().map(|m| m.len()).unwrap_or(0)
    }

    /// Evict the oldest-idle session. Caller holds the lock.
    fn evict_oldest(map: &mut HashMap<String, Session>) {
        if let Some(oldest) = map
            .iter()
            .min_by_key(|(_, s)| s.last_active)
            .map(|(id, _)| id.clone())
        {
            map.remove(&oldest);
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn history(&self, session_id: &str) -> Vec<Turn> {
        let Ok(map) = self.inner.lock() else {
            tracing::warn!("session store lock poisoned — returning empty history");
            return Vec::new();
        };
        map.get(session_id)
            .map(|s| s.turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn append(&self, session_id: &str, role: TurnRole, content: &str) {
        if content.trim().is_empty() {
            return;
        }
        let Ok(mut map) = self.inner.lock() else {
            tracing::warn!(session = %session_id, "session store lock poisoned — dropping turn");
            return;
        };

        if !map.contains_key(session_id) && map.len() >= self.capacity {
            Self::evict_oldest(&mut map);
        }

        let session = map.entry(session_id.to_owned()).or_insert_with(|| Session {
            turns: VecDeque::new(),
            last_active: Utc::now(),
        });
        session.turns.push_back(Turn::new(role, content));
        while session.turns.len() > self.max_turns {
            session.turns.pop_front();
        }
        session.last_active = Utc::now();
    }

    fn evict_expired(&self) {
        let Ok(mut map) = self.inner.lock() else {
            return;
        };
        let cutoff = Utc::now() - Duration::seconds(self.ttl_secs as i64);
        let before = map.len();
        map.retain(|_, s| s.last_active >= cutoff);
        let evicted = before - map.len();
        if evicted > 0 {
            tracing::debug!(evicted, "expired sessions removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemorySessionStore {
        MemorySessionStore::new(4, 3600, 8)
    }

    #[test]
    fn history_empty_for_unknown_session() {
        assert!(store().history("nope").is_empty());
    }

    #[test]
    fn append_and_read_back_in_order() {
        let s = store();
        s.append("s1", TurnRole::User, "hello");
        s.append("s1", TurnRole::Assistant, "hi there");
        let h = s.history("s1");
        assert_eq!(h.len(), 2);
        assert_eq!(h[0].role, TurnRole::User);
        assert_eq!(h[0].content, "hello");
        assert_eq!(h[1].role, TurnRole::Assistant);
    }

    #[test]
    fn blank_content_is_a_noop() {
        let s = store();
        s.append("s1", TurnRole::User, "   ");
        s.append("s1", TurnRole::User, "");
        assert!(s.history("s1").is_empty());
    }

    #[test]
    fn ring_buffer_keeps_most_recent() {
        let s = store(); // max 4 turns
        for i in 0..10 {
            s.append("s1", TurnRole::User, &format!("msg {i}"));
        }
        let h = s.history("s1");
        assert_eq!(h.len(), 4);
        assert_eq!(h[0].content, "msg 6");
        assert_eq!(h[3].content, "msg 9");
    }

    #[test]
    fn sessions_are_isolated() {
        let s = store();
        s.append("a", TurnRole::User, "for a");
        s.append("b", TurnRole::User, "for b");
        assert_eq!(s.history("a").len(), 1);
        assert_eq!(s.history("b").len(), 1);
        assert_eq!(s.history("a")[0].content, "for a");
    }

    #[test]
    fn ttl_eviction_removes_idle_sessions() {
        let s = MemorySessionStore::new(4, 0, 8); // everything expires immediately
        s.append("s1", TurnRole::User, "hello");
        std::thread::sleep(std::time::Duration::from_millis(5));
        s.evict_expired();
        assert!(s.history("s1").is_empty());
        assert_eq!(s.session_count(), 0);
    }

    #[test]
    fn capacity_evicts_oldest_idle_session() {
        let s = MemorySessionStore::new(4, 3600, 2);
        s.append("first", TurnRole::User, "1");
        std::thread::sleep(std::time::Duration::from_millis(5));
        s.append("second", TurnRole::User, "2");
        std::thread::sleep(std::time::Duration::from_millis(5));
        s.append("third", TurnRole::User, "3");
        assert_eq!(s.session_count(), 2);
        assert!(s.history("first").is_empty(), "oldest-idle session evicted");
        assert_eq!(s.history("third").len(), 1);
    }

    #[test]
    fn concurrent_appends_to_one_session_stay_ordered_pairs() {
        use std::sync::Arc;
        let s = Arc::new(MemorySessionStore::new(64, 3600, 8));
        let mut handles = Vec::new();
        for t in 0..4 {
            let s = Arc::clone(&s);
            handles.push(std::thread::spawn(move || {
                for i in 0..8 {
                    s.append("shared", TurnRole::User, &format!("t{t}-{i}"));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        // 32 appends, all retained (cap 64) and none torn.
        assert_eq!(s.history("shared").len(), 32);
    }
}
