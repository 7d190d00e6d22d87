use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use database_layer::OccurrenceStatus;

/// Every event flowing through the stream or the SSE hub is one of these
/// tagged variants (§9 redesign flag: "tagged variant, not a loose JSON
/// bag"). `kind` is the serde tag so a consumer can match without having to
/// guess a schema from a free-form payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DomainEvent {
    ObitoDetected {
        obito_id: Uuid,
        hospital_id: Uuid,
        tenant_id: Uuid,
        detected_at: DateTime<Utc>,
        death_at: DateTime<Utc>,
        age_years: i32,
        masked_patient_name: String,
        unmasked_patient_name: String,
        is_unidentified: bool,
        cause_of_death: Option<String>,
        sector: Option<String>,
    },
    NewOccurrence {
        occurrence_id: Uuid,
        tenant_id: Uuid,
        hospital_id: Uuid,
        priority_score: i32,
        window_expires_at: DateTime<Utc>,
    },
    StatusUpdate {
        occurrence_id: Uuid,
        tenant_id: Uuid,
        previous_status: OccurrenceStatus,
        new_status: OccurrenceStatus,
    },
    MapUpdate {
        tenant_id: Uuid,
        hospital_id: Uuid,
        occurrence_id: Uuid,
        status: OccurrenceStatus,
    },
    SystemStatusChange {
        component: String,
        previous_status: String,
        new_status: String,
        changed_at: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Tenant the event is scoped to, if any — `SystemStatusChange` is
    /// engine-wide and has none. Used by the SSE hub to fan out only to
    /// subscribers of the matching tenant.
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            DomainEvent::ObitoDetected { tenant_id, .. }
            | DomainEvent::NewOccurrence { tenant_id, .. }
            | DomainEvent::StatusUpdate { tenant_id, .. }
            | DomainEvent::MapUpdate { tenant_id, .. } => Some(*tenant_id),
            DomainEvent::SystemStatusChange { .. } => None,
        }
    }

    /// Hospital the event is scoped to, if any, used by the SSE hub's
    /// per-subscriber hospital filter (§4.3... the SSE subscription's
    /// `hospital_filter`, §5). `StatusUpdate` carries no hospital id, so it
    /// always passes the filter — a subscriber watching one hospital still
    /// wants to see its own occurrences change status.
    pub fn hospital_id(&self) -> Option<Uuid> {
        match self {
            DomainEvent::ObitoDetected { hospital_id, .. }
            | DomainEvent::NewOccurrence { hospital_id, .. }
            | DomainEvent::MapUpdate { hospital_id, .. } => Some(*hospital_id),
            DomainEvent::StatusUpdate { .. } | DomainEvent::SystemStatusChange { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let event = DomainEvent::NewOccurrence {
            occurrence_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            priority_score: 72,
            window_expires_at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "NewOccurrence");
    }

    #[test]
    fn system_status_change_has_no_tenant() {
        let event = DomainEvent::SystemStatusChange {
            component: "death-listener".to_string(),
            previous_status: "UP".to_string(),
            new_status: "DOWN".to_string(),
            changed_at: Utc::now(),
        };
        assert_eq!(event.tenant_id(), None);
    }

    #[test]
    fn status_update_has_no_hospital_id_but_new_occurrence_does() {
        let occurrence_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();
        let status_update = DomainEvent::StatusUpdate {
            occurrence_id,
            tenant_id: Uuid::new_v4(),
            previous_status: OccurrenceStatus::Pendente,
            new_status: OccurrenceStatus::EmAndamento,
        };
        assert_eq!(status_update.hospital_id(), None);

        let new_occurrence = DomainEvent::NewOccurrence {
            occurrence_id,
            tenant_id: Uuid::new_v4(),
            hospital_id,
            priority_score: 70,
            window_expires_at: Utc::now(),
        };
        assert_eq!(new_occurrence.hospital_id(), Some(hospital_id));
    }
}
