// Audit entry types and structures
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity an audit entry is filed under. `Critical` entries are the ones
/// an operator dashboard would page on (e.g. `NoOperatorsOnDuty`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Critical,
}

/// A single append-only audit record. Every rule rejection, shift fallback,
/// and authentication event in the engine writes one of these rather than
/// relying on a log line alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: Option<Uuid>,
    pub action: String,
    pub entity_kind: String,
    pub entity_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub severity: Severity,
    pub details: serde_json::Value,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: impl Into<String>,
        entity_kind: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: None,
            action: action.into(),
            entity_kind: entity_kind.into(),
            entity_id: None,
            tenant_id: None,
            severity,
            details: serde_json::Value::Null,
            ip: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor: Uuid) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_entity(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_tenant(mut self, tenant_id: Uuid) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }
}
