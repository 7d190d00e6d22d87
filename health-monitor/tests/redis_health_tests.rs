//! Exercises the status-transition and KV-persistence side of the health
//! monitor against a live Redis; the database probe itself is covered only
//! by `database_layer::DbPool::is_healthy`'s own unit tests, not here, since
//! that would additionally require a reachable Postgres instance.
//!
//! Run with: cargo test -p health-monitor --test redis_health_tests -- --ignored

use std::sync::Arc;
use std::time::Duration;

use config_engine::SmtpSettings;
use email_service::EmailChannel;
use events_bus::DomainEvent;
use redis::aio::ConnectionManager;
use sse_hub::SseHub;
use triage_motor::TriageStats;
use uuid::Uuid;

async fn setup_conn() -> ConnectionManager {
    let redis_url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let client = redis::Client::open(redis_url).expect("valid redis url");
    client.get_connection_manager().await.expect("redis reachable for ignored integration test")
}

fn unconfigured_email() -> EmailChannel {
    EmailChannel::new(SmtpSettings { host: None, port: None, username: None, password: None, from_address: None })
}

/// A DOWN->DOWN "transition" isn't one; the real assertion here is that a
/// first check with no prior KV state doesn't crash and that a
/// `database_layer::DbPool` can at least be constructed against a local
/// Postgres when the operator has one running, without requiring it for
/// the rest of the suite.
#[tokio::test]
#[ignore]
async fn a_fresh_check_persists_its_state_map_without_a_prior_value() {
    use redis::AsyncCommands;

    let conn = setup_conn().await;
    let mut raw_conn = conn.clone();
    let _: () = raw_conn.del("vitalconnect:health:last_states").await.unwrap();
    let _: () = raw_conn.del("vitalconnect:health:alert_cooldowns").await.unwrap();

    let sse = SseHub::new();
    let (_sub_id, mut sse_rx) = sse.subscribe(Uuid::nil(), Uuid::nil(), database_layer::UserRole::Admin, None);

    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping (requires both REDIS_URL and DATABASE_URL)");
        return;
    };
    let pool = database_layer::DbPool::connect(&database_url).await.expect("postgres reachable for ignored integration test");

    let triage_stats = Arc::new(TriageStats::new());
    let monitor = health_monitor::HealthMonitor::new(
        pool,
        conn,
        sse,
        triage_stats,
        unconfigured_email(),
        None,
        Duration::from_millis(50),
        5,
    );

    let shutdown = tokio_util::sync::CancellationToken::new();
    let monitor = Arc::new(monitor);
    let runner = monitor.clone();
    let shutdown_clone = shutdown.clone();
    let handle = tokio::spawn(async move { runner.run(shutdown_clone).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let snapshot = monitor.snapshot().expect("at least one check completed");
    assert!(snapshot.components.contains_key("database"));
    assert!(snapshot.components.contains_key("kv"));
    assert!(snapshot.components.contains_key("listener"));
    assert!(snapshot.components.contains_key("triage_motor"));
    assert!(snapshot.components.contains_key("sse_hub"));
    assert!(snapshot.components.contains_key("api"));

    let mut saw_a_status_change_event = false;
    while let Ok(event) = sse_rx.try_recv() {
        if matches!(event, DomainEvent::SystemStatusChange { .. }) {
            saw_a_status_change_event = true;
        }
    }
    assert!(saw_a_status_change_event, "the first check should report every component as a transition from UNKNOWN");
}
