//! Durable store collaborator: fire-and-forget event and memory logging.
//!
//! Best-effort by contract — implementations log their own failures and
//! never return them; the orchestrator calls these off the critical path.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Record a usage event (kind + domain + free-form metadata).
    async fn record_event(&self, kind: &str, domain: &str, meta: Value);

    /// Record an input/output pair from a committed exchange.
    async fn record_memory(&self, kind: &str, domain: &str, input: &str, output: &str);
}

/// Default store: drops everything.
pub struct NoopDurableStore;

#[async_trait]
impl DurableStore for NoopDurableStore {
    async fn record_event(&self, _kind: &str, _domain: &str, _meta: Value) {}

    async fn record_memory(&self, _kind: &str, _domain: &str, _input: &str, _output: &str) {}
}

/// Postgres-backed store. Requires the `events` and `memories` tables from
/// the workspace migrations.
pub struct PgDurableStore {
    pool: PgPool,
}

impl PgDurableStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DurableStore for PgDurableStore {
    async fn record_event(&self, kind: &str, domain: &str, meta: Value) {
        let result = sqlx::query(
            "INSERT INTO events (id, kind, domain, meta, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(domain)
        .bind(&meta)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, kind, domain, "event record dropped");
        }
    }

    async fn record_memory(&self, kind: &str, domain: &str, input: &str, output: &str) {
        let result = sqlx::query(
            "INSERT INTO memories (id, kind, domain, input_text, output_text, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(domain)
        .bind(input)
        .bind(output)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, kind, domain, "memory record dropped");
        }
    }
}
