use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use database_layer::{HospitalRepository, Obito, ObitoRepository, TenantContext, TenantRepository, UserRole};
use events_bus::{DomainEvent, RedisStreamBus, OBITOS_DETECTADOS_STREAM};
use redis::aio::ConnectionManager;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;
use crate::heartbeat;
use crate::stats::ListenerStats;

/// Drains every active hospital's unprocessed death records and publishes
/// one `ObitoDetected` event per record (§4.1). Runs as one of the engine's
/// long-lived background workers, discovering hospitals afresh on every
/// poll tick rather than caching the tenant/hospital set, since new
/// hospitals and tenants are rare and this keeps the worker stateless.
pub struct DeathListener {
    tenants: Arc<dyn TenantRepository>,
    hospitals: Arc<dyn HospitalRepository>,
    obitos: Arc<dyn ObitoRepository>,
    bus: RedisStreamBus,
    kv: ConnectionManager,
    poll_interval: Duration,
    lookback: chrono::Duration,
    stats: Arc<ListenerStats>,
}

impl DeathListener {
    pub fn new(
        tenants: Arc<dyn TenantRepository>,
        hospitals: Arc<dyn HospitalRepository>,
        obitos: Arc<dyn ObitoRepository>,
        bus: RedisStreamBus,
        kv: ConnectionManager,
        poll_interval: Duration,
    ) -> Self {
        Self {
            tenants,
            hospitals,
            obitos,
            bus,
            kv,
            poll_interval,
            lookback: chrono::Duration::hours(24),
            stats: Arc::new(ListenerStats::new()),
        }
    }

    pub fn stats(&self) -> Arc<ListenerStats> {
        self.stats.clone()
    }

    /// Runs the poll loop and the heartbeat loop concurrently until
    /// `shutdown` is cancelled. A poll-tick error is logged and counted,
    /// never propagated — §4.1 requires the worker to keep running and
    /// retry on the next tick.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut poll_ticker = tokio::time::interval(self.poll_interval);
        let mut heartbeat_ticker = tokio::time::interval(Duration::from_secs(heartbeat::HEARTBEAT_INTERVAL_SECS));

        loop {
            tokio::select! {
                _ = poll_ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        self.stats.record_error();
                        tracing::warn!(error = %e, "death listener poll tick failed, retrying next tick");
                    }
                }
                _ = heartbeat_ticker.tick() => {
                    if let Err(e) = heartbeat::write(&self.kv).await {
                        tracing::warn!(error = %e, "failed to refresh listener heartbeat");
                    }
                }
                _ = shutdown.cancelled() => {
                    self.stats.mark_stopped();
                    return Ok(());
                }
            }
        }
    }

    async fn poll_once(&self) -> Result<()> {
        let now = Utc::now();
        self.stats.record_poll(now);
        let since = now - self.lookback;

        let tenants = self.tenants.list_all().await?;
        for tenant in tenants {
            let ctx = system_context(tenant.id);
            let hospitals = self.hospitals.list_active_by_tenant(&ctx).await?;
            for hospital in hospitals {
                if let Err(e) = self.drain_hospital(&ctx, hospital.id, since).await {
                    self.stats.record_error();
                    tracing::warn!(hospital_id = %hospital.id, error = %e, "failed to drain hospital's death table this tick");
                }
            }
        }
        Ok(())
    }

    async fn drain_hospital(&self, ctx: &TenantContext, hospital_id: Uuid, since: DateTime<Utc>) -> Result<()> {
        let records = self.obitos.find_unprocessed_since(ctx, hospital_id, since).await?;
        for obito in &records {
            if let Err(e) = self.process_one(ctx, obito).await {
                self.stats.record_error();
                tracing::warn!(obito_id = %obito.id, error = %e, "skipping a death record this tick, will retry next poll");
            }
        }
        Ok(())
    }

    /// Idempotency re-check, publish, then flag (§4.1 step order). A
    /// record already flagged `processed` by a previous tick (or by a
    /// concurrent listener instance) is skipped silently, not an error.
    async fn process_one(&self, ctx: &TenantContext, obito: &Obito) -> Result<()> {
        if self.obitos.is_processed(ctx, obito.id).await? {
            return Ok(());
        }

        let detected_at = Utc::now();
        let event = DomainEvent::ObitoDetected {
            obito_id: obito.id,
            hospital_id: obito.hospital_id,
            tenant_id: obito.tenant_id,
            detected_at,
            death_at: obito.death_at,
            age_years: obito.age_years_at(obito.death_at),
            masked_patient_name: obito.masked_patient_name.clone(),
            unmasked_patient_name: obito.unmasked_patient_name.clone(),
            is_unidentified: obito.is_unidentified,
            cause_of_death: obito.cause_of_death.clone(),
            sector: obito.sector.clone(),
        };

        self.bus.publish(OBITOS_DETECTADOS_STREAM, &event).await?;
        self.obitos.mark_processed(ctx, obito.id).await?;
        self.stats.record_detection(detected_at);
        Ok(())
    }
}

/// Synthetic tenant context the listener acts under. It has no real user
/// behind it (§9: every repository call needs a `TenantContext`, and a
/// background sweep has no authenticated actor), so `user_id` is the nil
/// UUID and privileges are elevated enough to read every active hospital.
fn system_context(tenant_id: Uuid) -> TenantContext {
    TenantContext::new(tenant_id, Uuid::nil(), UserRole::Admin, true)
}
