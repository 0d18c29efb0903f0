//! Session memory: bounded, expiring, per-session ordered turn logs.
//!
//! The store is injected behind a trait so the ephemeral in-memory map and
//! the opt-in file-backed variant are interchangeable. Operations never fail
//! upward — a broken backend degrades to empty reads and dropped writes.

mod file;
mod session;

pub use file::FileSessionStore;
pub use session::MemorySessionStore;

use crate::types::{Turn, TurnRole};

/// Contract shared by all session stores.
pub trait SessionStore: Send + Sync {
    /// Prior turns for a session, oldest first. Empty for unknown/expired ids.
    fn history(&self, session_id: &str) -> Vec<Turn>;

    /// Append a turn and refresh the session's last-activity timestamp.
    /// No-op when `content` is blank. Trims to the configured turn budget,
    /// dropping the oldest.
    fn append(&self, session_id: &str, role: TurnRole, content: &str);

    /// Drop all sessions idle longer than the configured TTL.
    fn evict_expired(&self);
}
