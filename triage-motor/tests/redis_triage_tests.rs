//! End-to-end rule evaluation, materialization, and notification fan-out
//! against a live Redis instance (event stream, consumer group, and
//! notification queues), with stub repositories standing in for the
//! database.
//!
//! Run with: cargo test -p triage-motor --test redis_triage_tests -- --ignored

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{
    DatabaseResult, Hospital, HospitalRepository, Occurrence, OccurrenceHistoryEntry, OccurrenceRepository,
    OccurrenceStatus, OutcomeKind, Shift, ShiftRepository, TenantContext, TriageRule, TriageRuleRepository, User,
    UserRepository, UserRole,
};
use events_bus::{DomainEvent, RedisStreamBus, OBITOS_DETECTADOS_STREAM};
use notification_queue::{Channel, NotificationChannel, NotificationQueue, QueueItem};
use redis::aio::ConnectionManager;
use sse_hub::SseHub;
use triage_motor::TriageMotor;
use uuid::Uuid;

async fn setup_conn() -> ConnectionManager {
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("valid redis url");
    client.get_connection_manager().await.expect("redis reachable for ignored integration test")
}

struct NoopChannel;

#[async_trait]
impl Channel for NoopChannel {
    async fn send(&self, _item: &QueueItem) -> notification_queue::Result<()> {
        Ok(())
    }
}

struct StubTriageRuleRepo {
    rules: Vec<TriageRule>,
}

#[async_trait]
impl TriageRuleRepository for StubTriageRuleRepo {
    async fn find_active_by_tenant(&self, _ctx: &TenantContext) -> DatabaseResult<Vec<TriageRule>> {
        Ok(self.rules.clone())
    }

    async fn create(&self, _ctx: &TenantContext, rule: TriageRule) -> DatabaseResult<TriageRule> {
        Ok(rule)
    }
}

struct StubHospitalRepo {
    hospitals: Vec<Hospital>,
}

#[async_trait]
impl HospitalRepository for StubHospitalRepo {
    async fn find_by_id(&self, _ctx: &TenantContext, id: Uuid) -> DatabaseResult<Hospital> {
        self.hospitals.iter().find(|h| h.id == id).cloned().ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn list_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<Hospital>> {
        Ok(self.hospitals.iter().filter(|h| h.tenant_id == ctx.tenant_id && h.is_active).cloned().collect())
    }
}

struct StubShiftRepo;

#[async_trait]
impl ShiftRepository for StubShiftRepo {
    async fn find_active_by_hospital_weekday(&self, _ctx: &TenantContext, _hospital_id: Uuid, _weekday: i16) -> DatabaseResult<Vec<Shift>> {
        Ok(vec![])
    }

    async fn find_active_by_hospital(&self, _ctx: &TenantContext, _hospital_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        Ok(vec![])
    }

    async fn find_active_by_user(&self, _ctx: &TenantContext, _user_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        Ok(vec![])
    }

    async fn create(
        &self,
        _ctx: &TenantContext,
        hospital_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
    ) -> DatabaseResult<Shift> {
        Ok(Shift { id: Uuid::new_v4(), tenant_id: Uuid::new_v4(), hospital_id, user_id, weekday, start_time, end_time, is_active: true })
    }

    async fn update(
        &self,
        _ctx: &TenantContext,
        shift_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: chrono::NaiveTime,
        end_time: chrono::NaiveTime,
    ) -> DatabaseResult<Shift> {
        Ok(Shift { id: shift_id, tenant_id: Uuid::new_v4(), hospital_id: Uuid::new_v4(), user_id, weekday, start_time, end_time, is_active: true })
    }

    async fn delete(&self, _ctx: &TenantContext, id: Uuid) -> DatabaseResult<Shift> {
        Ok(Shift {
            id,
            tenant_id: Uuid::new_v4(),
            hospital_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            weekday: 0,
            start_time: chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
            is_active: true,
        })
    }
}

struct StubUserRepo {
    gestors: Vec<User>,
}

#[async_trait]
impl UserRepository for StubUserRepo {
    async fn find_by_email(&self, _email: &str) -> DatabaseResult<Option<User>> {
        Ok(None)
    }

    async fn find_by_id(&self, _ctx: &TenantContext, id: Uuid) -> DatabaseResult<User> {
        self.gestors.iter().find(|u| u.id == id).cloned().ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn find_active_by_hospital_and_role(&self, _ctx: &TenantContext, _hospital_id: Uuid, _role: UserRole) -> DatabaseResult<Vec<User>> {
        Ok(self.gestors.clone())
    }

    async fn find_active_by_ids(&self, _ctx: &TenantContext, _user_ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        Ok(vec![])
    }
}

struct StubOccurrenceRepo {
    occurrences: parking_lot::Mutex<Vec<Occurrence>>,
}

#[async_trait]
impl OccurrenceRepository for StubOccurrenceRepo {
    async fn create_if_absent(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        obito_id: Uuid,
        priority_score: i32,
        masked_patient_name: String,
        clinical_payload: serde_json::Value,
        death_at: DateTime<Utc>,
        window_expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Occurrence> {
        let mut occurrences = self.occurrences.lock();
        if let Some(existing) = occurrences.iter().find(|o| o.tenant_id == ctx.tenant_id && o.obito_id == obito_id) {
            return Ok(existing.clone());
        }
        let occurrence = Occurrence {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id,
            hospital_id,
            obito_id,
            status: OccurrenceStatus::Pendente,
            priority_score,
            masked_patient_name,
            clinical_payload,
            death_at,
            window_expires_at,
            first_notified_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        occurrences.push(occurrence.clone());
        Ok(occurrence)
    }

    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Occurrence> {
        self.occurrences
            .lock()
            .iter()
            .find(|o| o.tenant_id == ctx.tenant_id && o.id == id)
            .cloned()
            .ok_or(database_layer::DatabaseError::NotFound)
    }

    async fn transition_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        _actor: Option<Uuid>,
        new_status: OccurrenceStatus,
        _outcome: Option<OutcomeKind>,
    ) -> DatabaseResult<Occurrence> {
        let mut occurrences = self.occurrences.lock();
        let occurrence = occurrences
            .iter_mut()
            .find(|o| o.tenant_id == ctx.tenant_id && o.id == id)
            .ok_or(database_layer::DatabaseError::NotFound)?;
        occurrence.status = new_status;
        Ok(occurrence.clone())
    }

    async fn find_expired_pending(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<Occurrence>> {
        Ok(self
            .occurrences
            .lock()
            .iter()
            .filter(|o| o.status == OccurrenceStatus::Pendente && o.window_expires_at <= now)
            .cloned()
            .collect())
    }

    async fn mark_first_notified(&self, ctx: &TenantContext, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()> {
        if let Some(occurrence) = self.occurrences.lock().iter_mut().find(|o| o.tenant_id == ctx.tenant_id && o.id == id) {
            if occurrence.first_notified_at.is_none() {
                occurrence.first_notified_at = Some(at);
            }
        }
        Ok(())
    }

    async fn history(&self, _ctx: &TenantContext, _id: Uuid) -> DatabaseResult<Vec<OccurrenceHistoryEntry>> {
        Ok(vec![])
    }

    async fn list(
        &self,
        ctx: &TenantContext,
        _filter: &database_layer::OccurrenceFilter,
    ) -> DatabaseResult<Vec<Occurrence>> {
        Ok(self.occurrences.lock().iter().filter(|o| o.tenant_id == ctx.tenant_id).cloned().collect())
    }
}

fn sample_user(gestor_email: &str, tenant_id: Uuid) -> User {
    User {
        id: Uuid::new_v4(),
        tenant_id,
        email: gestor_email.to_string(),
        password_hash: String::new(),
        display_name: "Gestor de Plantao".to_string(),
        role: UserRole::Gestor,
        phone: None,
        notify_email: true,
        notify_sms: false,
        is_super_admin: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore]
async fn accepted_death_materializes_an_occurrence_and_enqueues_an_email() {
    let conn = setup_conn().await;
    let bus = RedisStreamBus::from_connection_manager(conn.clone());
    bus.ensure_group(OBITOS_DETECTADOS_STREAM, "triage-motor").await.unwrap();

    let tenant_id = Uuid::new_v4();
    let hospital_id = Uuid::new_v4();
    let obito_id = Uuid::new_v4();
    let death_at = Utc::now() - chrono::Duration::hours(1);

    bus.publish(
        OBITOS_DETECTADOS_STREAM,
        &DomainEvent::ObitoDetected {
            obito_id,
            hospital_id,
            tenant_id,
            detected_at: Utc::now(),
            death_at,
            age_years: 70,
            masked_patient_name: "M.C.S.".to_string(),
            unmasked_patient_name: "Maria Clara Souza".to_string(),
            is_unidentified: false,
            cause_of_death: Some("Infarto".to_string()),
            sector: Some("UTI".to_string()),
        },
    )
    .await
    .unwrap();

    let gestor = sample_user("gestor@hospital-central.dev", tenant_id);
    let gestor_id = gestor.id;

    let rules = Arc::new(StubTriageRuleRepo {
        rules: vec![TriageRule {
            id: Uuid::new_v4(),
            tenant_id,
            name: "max_age".to_string(),
            description: None,
            priority: 10,
            is_active: true,
            kind: database_layer::RuleKind::MaxAge,
            action: database_layer::RuleAction::Reject,
            parameters: serde_json::json!({"threshold_years": 80}),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }],
    });
    let occurrences = Arc::new(StubOccurrenceRepo { occurrences: parking_lot::Mutex::new(vec![]) });
    let hospitals = Arc::new(StubHospitalRepo {
        hospitals: vec![Hospital {
            id: hospital_id,
            tenant_id,
            name: "Hospital Central".into(),
            code: "HC1".into(),
            address: None,
            phone: None,
            latitude: None,
            longitude: None,
            connection_config: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }],
    });
    let sse = SseHub::new();
    let (_sub_id, mut sse_rx) = sse.subscribe(Uuid::new_v4(), tenant_id, UserRole::Admin, None);

    let shift_cache = shift_routing::ShiftCache::new(conn.clone());
    let router = Arc::new(shift_routing::ShiftRouter::new(shift_cache, Arc::new(StubShiftRepo), Arc::new(StubUserRepo { gestors: vec![gestor] })));

    let email_queue = Arc::new(NotificationQueue::new(conn.clone(), NotificationChannel::Email, NoopChannel, Duration::from_secs(30)));
    let sms_queue = Arc::new(NotificationQueue::new(conn.clone(), NotificationChannel::Sms, NoopChannel, Duration::from_secs(30)));
    let audit = Arc::new(audit_engine::InMemoryAuditSink::new());

    let motor = Arc::new(TriageMotor::new(
        rules,
        occurrences.clone(),
        hospitals,
        bus,
        sse,
        router,
        email_queue.clone(),
        sms_queue,
        audit,
        "test-consumer",
        6,
        "https://app.vitalconnect.dev",
    ));

    let shutdown = tokio_util::sync::CancellationToken::new();
    let runner = motor.clone();
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { runner.run(shutdown_clone).await });

    tokio::time::sleep(Duration::from_millis(500)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let ctx = TenantContext::new(tenant_id, Uuid::nil(), UserRole::Admin, true);
    let stored = occurrences.occurrences.lock().iter().find(|o| o.obito_id == obito_id).cloned().expect("occurrence materialized");
    assert_eq!(stored.status, OccurrenceStatus::Pendente);
    assert!(stored.priority_score >= 50);
    assert!(stored.first_notified_at.is_some());
    drop(ctx);

    let snapshot = motor.stats().snapshot();
    assert_eq!(snapshot.accepted, 1);
    assert_eq!(snapshot.rejected, 0);

    let email_item = email_queue.dequeue().await.unwrap().expect("email item queued for the gestor fallback");
    assert_eq!(email_item.user_id, gestor_id);
    assert_eq!(email_item.occurrence_id, stored.id);

    let sse_event = sse_rx.try_recv().expect("a new_occurrence SSE event was published");
    match sse_event {
        DomainEvent::NewOccurrence { occurrence_id, .. } => assert_eq!(occurrence_id, stored.id),
        other => panic!("unexpected SSE event: {other:?}"),
    }
}
