use std::sync::Arc;
use std::time::Duration;

use audit_engine::{AuditEntry, AuditSink, Severity};
use chrono::Utc;
use database_layer::{
    HospitalRepository, Occurrence, OccurrenceRepository, OccurrenceStatus, TenantContext, TriageRuleRepository, UserRole,
};
use events_bus::{DomainEvent, RedisStreamBus, OBITOS_DETECTADOS_STREAM};
use notification_queue::{Channel, NotificationChannel, NotificationPayload, NotificationQueue, QueueError, QueueItem};
use shift_routing::{Resolution, ShiftRouter};
use sse_hub::SseHub;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;
use crate::rules::{self, Decision, ObitoFacts};
use crate::stats::TriageStats;

const CONSUMER_GROUP: &str = "triage-motor";
const READ_BATCH: usize = 10;
const READ_BLOCK_MS: usize = 2000;
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Consumes `obitos:detectados` as a named group, evaluates each death
/// against its tenant's rules, materializes an occurrence on accept, and
/// routes + enqueues notifications (§4.2). Runs alongside a one-minute
/// window-expiry sweeper in the same loop.
pub struct TriageMotor<E: Channel, S: Channel> {
    rules: Arc<dyn TriageRuleRepository>,
    occurrences: Arc<dyn OccurrenceRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    bus: RedisStreamBus,
    sse: SseHub,
    router: Arc<ShiftRouter>,
    email_queue: Arc<NotificationQueue<E>>,
    sms_queue: Arc<NotificationQueue<S>>,
    audit: Arc<dyn AuditSink>,
    consumer_name: String,
    default_window_hours: i64,
    dashboard_base_url: String,
    stats: Arc<TriageStats>,
}

impl<E: Channel, S: Channel> TriageMotor<E, S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rules: Arc<dyn TriageRuleRepository>,
        occurrences: Arc<dyn OccurrenceRepository>,
        hospitals: Arc<dyn HospitalRepository>,
        bus: RedisStreamBus,
        sse: SseHub,
        router: Arc<ShiftRouter>,
        email_queue: Arc<NotificationQueue<E>>,
        sms_queue: Arc<NotificationQueue<S>>,
        audit: Arc<dyn AuditSink>,
        consumer_name: impl Into<String>,
        default_window_hours: i64,
        dashboard_base_url: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            occurrences,
            hospitals,
            bus,
            sse,
            router,
            email_queue,
            sms_queue,
            audit,
            consumer_name: consumer_name.into(),
            default_window_hours,
            dashboard_base_url: dashboard_base_url.into(),
            stats: Arc::new(TriageStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<TriageStats> {
        self.stats.clone()
    }

    /// Runs the consumer loop and the window-expiry sweeper concurrently
    /// until `shutdown` is cancelled. Creates the consumer group on first
    /// start; a group that already exists is left untouched.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        self.bus.ensure_group(OBITOS_DETECTADOS_STREAM, CONSUMER_GROUP).await?;
        let mut sweep_ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            tokio::select! {
                result = self.bus.read_group(OBITOS_DETECTADOS_STREAM, CONSUMER_GROUP, &self.consumer_name, READ_BATCH, READ_BLOCK_MS) => {
                    match result {
                        Ok(entries) => {
                            for (entry_id, event) in entries {
                                if let Err(e) = self.handle_entry(&entry_id, event).await {
                                    self.stats.record_error();
                                    tracing::warn!(entry_id = %entry_id, error = %e, "failed to process a death event, it will be redelivered");
                                }
                            }
                        }
                        Err(e) => {
                            self.stats.record_error();
                            tracing::warn!(error = %e, "failed to read the death stream this cycle");
                        }
                    }
                }
                _ = sweep_ticker.tick() => {
                    if let Err(e) = self.sweep_expired().await {
                        self.stats.record_error();
                        tracing::warn!(error = %e, "window-expiry sweep failed");
                    }
                }
                _ = shutdown.cancelled() => {
                    self.stats.mark_stopped();
                    return Ok(());
                }
            }
        }
    }

    /// Evaluates one delivered entry and acknowledges it only after the
    /// downstream side effect (audit record on reject, occurrence upsert on
    /// accept) has succeeded (§4.2 consumption contract). A crash between
    /// the side effect and the ack causes redelivery, which is safe: reject
    /// auditing is naturally idempotent-enough for an Info log, and
    /// `create_if_absent` plus the `first_notified_at` guard keep a
    /// redelivered accept from double-materializing or double-notifying.
    async fn handle_entry(&self, entry_id: &str, event: DomainEvent) -> Result<()> {
        let DomainEvent::ObitoDetected {
            obito_id,
            hospital_id,
            tenant_id,
            death_at,
            age_years,
            masked_patient_name,
            cause_of_death,
            sector,
            is_unidentified,
            ..
        } = event
        else {
            self.bus.ack(OBITOS_DETECTADOS_STREAM, CONSUMER_GROUP, entry_id).await?;
            return Ok(());
        };

        let ctx = system_context(tenant_id);
        let active_rules = self.rules.find_active_by_tenant(&ctx).await?;
        let now = Utc::now();
        let facts = ObitoFacts { age_years, cause_of_death: cause_of_death.clone(), sector: sector.clone(), is_unidentified, death_at };

        match rules::evaluate(&active_rules, &facts, now) {
            Decision::Rejected { rule } => {
                self.stats.record_rejection();
                self.audit
                    .record(
                        AuditEntry::new("occurrence.rule_rejected", "obito", Severity::Info)
                            .with_tenant(tenant_id)
                            .with_entity(obito_id)
                            .with_details(serde_json::json!({ "rule": format!("{rule:?}") })),
                    )
                    .await?;
            }
            Decision::Accepted { score } => {
                let window_hours = rules::window_hours_for(&active_rules, self.default_window_hours);
                let window_expires_at = death_at + chrono::Duration::hours(window_hours);
                let clinical_payload = serde_json::json!({
                    "sector": sector,
                    "cause_of_death": cause_of_death,
                    "age_years": age_years,
                });

                let occurrence = self
                    .occurrences
                    .create_if_absent(&ctx, hospital_id, obito_id, score, masked_patient_name, clinical_payload, death_at, window_expires_at)
                    .await?;
                self.stats.record_materialized();

                if occurrence.first_notified_at.is_none() {
                    self.sse.publish(DomainEvent::NewOccurrence {
                        occurrence_id: occurrence.id,
                        tenant_id,
                        hospital_id,
                        priority_score: occurrence.priority_score,
                        window_expires_at: occurrence.window_expires_at,
                    });
                    self.notify(&ctx, hospital_id, &occurrence).await?;
                    self.occurrences.mark_first_notified(&ctx, occurrence.id, now).await?;
                }
            }
        }

        self.bus.ack(OBITOS_DETECTADOS_STREAM, CONSUMER_GROUP, entry_id).await?;
        Ok(())
    }

    /// Resolves recipients via §4.3 and enqueues one item per channel the
    /// user has opted into. `NoOperatorsOnDuty` proceeds with a WARN audit
    /// entry and no queued items, leaving the SSE event already published
    /// in `handle_entry` as the only notification (dashboard-only, §4.3).
    async fn notify(&self, ctx: &TenantContext, hospital_id: Uuid, occurrence: &Occurrence) -> Result<()> {
        let resolution = self.router.resolve(ctx, hospital_id, occurrence.death_at).await?;

        if matches!(resolution, Resolution::NoOperatorsOnDuty) {
            self.audit
                .record(
                    AuditEntry::new("shift.no_operators_on_duty", "hospital", Severity::Warn)
                        .with_tenant(ctx.tenant_id)
                        .with_entity(hospital_id),
                )
                .await?;
            return Ok(());
        }

        let hospital = self.hospitals.find_by_id(ctx, hospital_id).await?;
        let payload = NotificationPayload {
            occurrence_id: occurrence.id,
            hospital_name: hospital.name,
            sector: occurrence.clinical_payload.get("sector").and_then(|v| v.as_str()).map(str::to_string),
            age_years: occurrence.clinical_payload.get("age_years").and_then(|v| v.as_i64()).unwrap_or(0) as i32,
            death_at: occurrence.death_at,
            window_expires_at: occurrence.window_expires_at,
            priority_score: occurrence.priority_score,
            dashboard_url: format!("{}/occurrences/{}", self.dashboard_base_url, occurrence.id),
        };
        let encoded = serde_json::to_string(&payload).map_err(QueueError::Serialize)?;

        for user in resolution.users() {
            if user.notify_email {
                let item =
                    QueueItem::new(ctx.tenant_id, occurrence.id, user.id, NotificationChannel::Email, user.email.clone(), encoded.clone());
                self.email_queue.enqueue(item).await?;
            }
            if user.notify_sms {
                if let Some(phone) = &user.phone {
                    let item =
                        QueueItem::new(ctx.tenant_id, occurrence.id, user.id, NotificationChannel::Sms, phone.clone(), encoded.clone());
                    self.sms_queue.enqueue(item).await?;
                }
            }
        }

        Ok(())
    }

    /// Moves every PENDENTE occurrence whose window has expired to
    /// CANCELADA (§4.2: "runs every minute"). Works across tenants in one
    /// pass since `find_expired_pending` is engine-wide, mirroring the
    /// death listener's own cross-tenant sweep shape.
    async fn sweep_expired(&self) -> Result<()> {
        let now = Utc::now();
        let expired = self.occurrences.find_expired_pending(now).await?;
        for occurrence in expired {
            let ctx = system_context(occurrence.tenant_id);
            self.occurrences.transition_status(&ctx, occurrence.id, None, OccurrenceStatus::Cancelada, None).await?;
            self.sse.publish(DomainEvent::StatusUpdate {
                occurrence_id: occurrence.id,
                tenant_id: occurrence.tenant_id,
                previous_status: OccurrenceStatus::Pendente,
                new_status: OccurrenceStatus::Cancelada,
            });
            self.stats.record_expired();
        }
        Ok(())
    }
}

/// Synthetic tenant context the motor acts under, same rationale as
/// `death_listener::listener::system_context`.
fn system_context(tenant_id: Uuid) -> TenantContext {
    TenantContext::new(tenant_id, Uuid::nil(), UserRole::Admin, true)
}
