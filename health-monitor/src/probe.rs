use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use database_layer::DbPool;
use death_listener::heartbeat;
use redis::aio::ConnectionManager;

use crate::status::{ComponentState, ComponentStatus, PROBE_TIMEOUT};

/// Runs `f` under the shared 2s per-probe timeout and turns the outcome
/// into a [`ComponentState`]: a timeout or an `Err` both classify as DOWN,
/// an `Ok` classifies by elapsed latency (§4.5).
async fn run<F, Fut>(f: F) -> ComponentState
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), String>>,
{
    let start = Instant::now();
    let outcome = tokio::time::timeout(PROBE_TIMEOUT, f()).await;
    let elapsed = start.elapsed();
    let last_check = Utc::now();

    match outcome {
        Ok(Ok(())) => {
            ComponentState { status: ComponentStatus::from_latency(elapsed), latency_ms: elapsed.as_millis() as u64, last_check, message: None }
        }
        Ok(Err(message)) => {
            ComponentState { status: ComponentStatus::Down, latency_ms: elapsed.as_millis() as u64, last_check, message: Some(message) }
        }
        Err(_) => ComponentState {
            status: ComponentStatus::Down,
            latency_ms: PROBE_TIMEOUT.as_millis() as u64,
            last_check,
            message: Some("probe timed out".to_string()),
        },
    }
}

/// Database probe: a round trip through the pool (§4.5: "simple round-trip
/// with 2s timeout"), reusing `DbPool::is_healthy`'s `SELECT 1`.
pub async fn probe_database(pool: &DbPool) -> ComponentState {
    run(|| async { if pool.is_healthy().await { Ok(()) } else { Err("SELECT 1 failed".to_string()) } }).await
}

/// KV probe: a `PING` round trip (§4.5).
pub async fn probe_kv(conn: &ConnectionManager) -> ComponentState {
    let mut conn = conn.clone();
    run(|| async move {
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
    .await
}

/// Death listener probe: the heartbeat key present and refreshed within two
/// periods (§4.1/§4.5). Freshness is boolean, not latency-derived, so a
/// fresh heartbeat always classifies UP and a stale or absent one DOWN —
/// there is no DEGRADED state for this probe.
pub async fn probe_listener(conn: &ConnectionManager) -> ComponentState {
    let last_check = Utc::now();
    match heartbeat::read(conn).await {
        Ok(last) if heartbeat::is_fresh(last, last_check) => {
            ComponentState { status: ComponentStatus::Up, latency_ms: 0, last_check, message: None }
        }
        Ok(_) => ComponentState {
            status: ComponentStatus::Down,
            latency_ms: 0,
            last_check,
            message: Some("heartbeat missing or stale".to_string()),
        },
        Err(e) => ComponentState { status: ComponentStatus::Down, latency_ms: 0, last_check, message: Some(e.to_string()) },
    }
}

/// Triage motor probe: the worker's own running flag (§4.5: "internal
/// running flag"), no network round trip involved.
pub fn probe_triage_motor(running: bool) -> ComponentState {
    ComponentState {
        status: if running { ComponentStatus::Up } else { ComponentStatus::Down },
        latency_ms: 0,
        last_check: Utc::now(),
        message: if running { None } else { Some("worker loop is not running".to_string()) },
    }
}

/// SSE hub probe: also an internal flag (§4.5); the hub has no background
/// task of its own, so it is UP whenever this process is alive to probe it.
pub fn probe_sse_hub() -> ComponentState {
    ComponentState { status: ComponentStatus::Up, latency_ms: 0, last_check: Utc::now(), message: None }
}

/// API probe: self, always UP while being probed (§4.5).
pub fn probe_api() -> ComponentState {
    ComponentState { status: ComponentStatus::Up, latency_ms: 0, last_check: Utc::now(), message: None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn a_successful_probe_classifies_by_latency() {
        let state = run(|| async { Ok(()) }).await;
        assert_eq!(state.status, ComponentStatus::Up);
        assert!(state.message.is_none());
    }

    #[tokio::test]
    async fn a_failing_probe_is_down_with_a_message() {
        let state = run(|| async { Err("boom".to_string()) }).await;
        assert_eq!(state.status, ComponentStatus::Down);
        assert_eq!(state.message.as_deref(), Some("boom"));
    }

    #[test]
    fn triage_motor_probe_follows_the_running_flag() {
        assert_eq!(probe_triage_motor(true).status, ComponentStatus::Up);
        assert_eq!(probe_triage_motor(false).status, ComponentStatus::Down);
    }
}
