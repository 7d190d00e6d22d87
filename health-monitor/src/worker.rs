use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use database_layer::DbPool;
use email_service::EmailChannel;
use events_bus::DomainEvent;
use parking_lot::RwLock;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use sse_hub::SseHub;
use tokio_util::sync::CancellationToken;
use triage_motor::TriageStats;

use crate::error::Result;
use crate::probe::{probe_api, probe_database, probe_kv, probe_listener, probe_sse_hub, probe_triage_motor};
use crate::status::{ComponentState, ComponentStatus};

const LAST_STATES_KEY: &str = "vitalconnect:health:last_states";
const ALERT_COOLDOWNS_KEY: &str = "vitalconnect:health:alert_cooldowns";
const LISTENER_COMPONENT: &str = "listener";

const DATABASE: &str = "database";
const KV: &str = "kv";
const TRIAGE_MOTOR: &str = "triage_motor";
const SSE_HUB: &str = "sse_hub";
const API: &str = "api";

#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub overall: ComponentStatus,
    pub components: HashMap<String, ComponentState>,
    pub checked_at: DateTime<Utc>,
}

/// Probes every engine component on an interval, composes an overall
/// status, persists the state map in KV so transition detection survives a
/// restart, and raises a cooldown-gated admin email when the death
/// listener specifically goes UP -> DOWN (§4.5).
pub struct HealthMonitor {
    pool: DbPool,
    conn: ConnectionManager,
    sse: SseHub,
    triage_stats: Arc<TriageStats>,
    email: EmailChannel,
    admin_alert_email: Option<String>,
    check_interval: Duration,
    alert_cooldown: chrono::Duration,
    snapshot: RwLock<Option<HealthSnapshot>>,
}

impl HealthMonitor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: DbPool,
        conn: ConnectionManager,
        sse: SseHub,
        triage_stats: Arc<TriageStats>,
        email: EmailChannel,
        admin_alert_email: Option<String>,
        check_interval: Duration,
        alert_cooldown_minutes: i64,
    ) -> Self {
        Self {
            pool,
            conn,
            sse,
            triage_stats,
            email,
            admin_alert_email,
            check_interval,
            alert_cooldown: chrono::Duration::minutes(alert_cooldown_minutes),
            snapshot: RwLock::new(None),
        }
    }

    /// The most recently completed check, for `/health/summary`. `None`
    /// until the first tick has run.
    pub fn snapshot(&self) -> Option<HealthSnapshot> {
        self.snapshot.read().clone()
    }

    pub async fn run(&self, shutdown: CancellationToken) -> Result<()> {
        let mut ticker = tokio::time::interval(self.check_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.check_once().await {
                        tracing::warn!(error = %e, "health check cycle failed");
                    }
                }
                _ = shutdown.cancelled() => {
                    return Ok(());
                }
            }
        }
    }

    async fn check_once(&self) -> Result<()> {
        let (database, kv, listener, triage, sse, api) = tokio::join!(
            probe_database(&self.pool),
            probe_kv(&self.conn),
            probe_listener(&self.conn),
            async { probe_triage_motor(self.triage_stats.is_running()) },
            async { probe_sse_hub() },
            async { probe_api() },
        );

        let mut components: HashMap<String, ComponentState> = HashMap::new();
        components.insert(DATABASE.to_string(), database);
        components.insert(KV.to_string(), kv);
        components.insert(LISTENER_COMPONENT.to_string(), listener);
        components.insert(TRIAGE_MOTOR.to_string(), triage);
        components.insert(SSE_HUB.to_string(), sse);
        components.insert(API.to_string(), api);

        let overall = ComponentStatus::compose(components.values().map(|c| c.status));
        let checked_at = Utc::now();

        let previous = self.load_last_states().await?;
        for (name, state) in &components {
            let previous_status = previous.get(name).map(|s| s.status);
            if previous_status != Some(state.status) {
                self.sse.publish(DomainEvent::SystemStatusChange {
                    component: name.clone(),
                    previous_status: previous_status.map(|s| s.to_string()).unwrap_or_else(|| "UNKNOWN".to_string()),
                    new_status: state.status.to_string(),
                    changed_at: checked_at,
                });

                if name == LISTENER_COMPONENT
                    && previous_status == Some(ComponentStatus::Up)
                    && state.status == ComponentStatus::Down
                {
                    self.maybe_alert(checked_at).await?;
                }
            }
        }

        self.save_last_states(&components).await?;
        *self.snapshot.write() = Some(HealthSnapshot { overall, components, checked_at });
        Ok(())
    }

    async fn maybe_alert(&self, now: DateTime<Utc>) -> Result<()> {
        let Some(to) = self.admin_alert_email.as_deref() else {
            return Ok(());
        };

        let mut cooldowns = self.load_cooldowns().await?;
        let due = cooldowns
            .get(LISTENER_COMPONENT)
            .map(|last| now - *last >= self.alert_cooldown)
            .unwrap_or(true);
        if !due {
            return Ok(());
        }

        let subject = "[VitalConnect] Death listener is DOWN";
        let body = format!("The death listener heartbeat went stale at {now}. Investigate immediately: a stalled listener means new deaths are not being detected.");
        if let Err(e) = self.email.send_raw(to, subject, &body).await {
            tracing::warn!(error = %e, "failed to send the listener-down admin alert");
        }

        cooldowns.insert(LISTENER_COMPONENT.to_string(), now);
        self.save_cooldowns(&cooldowns).await?;
        Ok(())
    }

    async fn load_last_states(&self) -> Result<HashMap<String, ComponentState>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(LAST_STATES_KEY).await?;
        Ok(match raw {
            Some(raw) => serde_json::from_str(&raw)?,
            None => HashMap::new(),
        })
    }

    async fn save_last_states(&self, states: &HashMap<String, ComponentState>) -> Result<()> {
        let raw = serde_json::to_string(states)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(LAST_STATES_KEY, raw).await?;
        Ok(())
    }

    async fn load_cooldowns(&self) -> Result<HashMap<String, DateTime<Utc>>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(ALERT_COOLDOWNS_KEY).await?;
        Ok(match raw {
            Some(raw) => serde_json::from_str(&raw)?,
            None => HashMap::new(),
        })
    }

    async fn save_cooldowns(&self, cooldowns: &HashMap<String, DateTime<Utc>>) -> Result<()> {
        let raw = serde_json::to_string(cooldowns)?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(ALERT_COOLDOWNS_KEY, raw).await?;
        Ok(())
    }
}
