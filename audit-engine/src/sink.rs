use async_trait::async_trait;
use parking_lot::Mutex;
use sqlx::PgPool;

use crate::entry::AuditEntry;
use crate::error::Result;

/// Append-only sink for audit entries. Workers hold an `Arc<dyn AuditSink>`
/// injected at construction (§9: no global singleton), so tests can swap in
/// `InMemoryAuditSink` without a database.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}

pub struct PostgresAuditSink {
    pool: PgPool,
}

impl PostgresAuditSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_entries
                (id, actor, action, entity_kind, entity_id, tenant_id, severity, details, ip, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id)
        .bind(entry.actor)
        .bind(&entry.action)
        .bind(&entry.entity_kind)
        .bind(entry.entity_id)
        .bind(entry.tenant_id)
        .bind(entry.severity)
        .bind(&entry.details)
        .bind(&entry.ip)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// In-memory sink used by tests and by any worker running without a
/// configured database (e.g. a dry-run CLI invocation).
#[derive(Default)]
pub struct InMemoryAuditSink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        self.entries.lock().push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Severity;

    #[tokio::test]
    async fn in_memory_sink_retains_recorded_entries() {
        let sink = InMemoryAuditSink::new();
        sink.record(AuditEntry::new("login", "user", Severity::Info))
            .await
            .unwrap();
        sink.record(AuditEntry::new("rule.rejected", "triage_rule", Severity::Warn))
            .await
            .unwrap();

        let entries = sink.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].action, "rule.rejected");
    }
}
