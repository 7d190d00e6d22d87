use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use auth_identity::{AuthService, IdentityConfig, RedisRateLimiter};
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use clap::Parser;
use config_engine::Settings;
use database_layer::{
    DbPool, PostgresHospitalRepository, PostgresObitoRepository, PostgresOccurrenceRepository,
    PostgresShiftRepository, PostgresTenantRepository, PostgresTriageRuleRepository, PostgresUserRepository,
};
use death_listener::DeathListener;
use email_service::EmailChannel;
use events_bus::RedisStreamBus;
use health_monitor::HealthMonitor;
use notification_queue::{NotificationChannel, NotificationQueue, NotificationWorker};
use shift_routing::{ShiftCache, ShiftRouter};
use sms_service::SmsChannel;
use sse_hub::SseHub;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod auth;
mod error;
mod routes;
mod state;

use state::AppState;

/// VitalConnect engine HTTP API and background workers.
#[derive(Parser, Debug)]
#[command(name = "vitalconnect-server")]
#[command(about = "Hospital death detection and corneal donation alert engine")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let settings = Settings::from_env()?;
    let settings = Arc::new(settings);

    info!(host = %args.host, port = args.port, "starting vitalconnect-server");

    let db = DbPool::connect_with(
        &settings.database.url,
        settings.database.max_connections,
        settings.database.min_connections,
        Duration::from_secs(settings.database.max_lifetime_secs),
    )
    .await?;

    let redis_client = redis::Client::open(settings.redis.url.clone())?;
    let kv = redis_client.get_connection_manager().await?;

    let hospitals = Arc::new(PostgresHospitalRepository::new(db.clone()));
    let occurrences = Arc::new(PostgresOccurrenceRepository::new(db.clone()));
    let shifts = Arc::new(PostgresShiftRepository::new(db.clone()));
    let users = Arc::new(PostgresUserRepository::new(db.clone()));
    let obitos = Arc::new(PostgresObitoRepository::new(db.clone()));
    let triage_rules = Arc::new(PostgresTriageRuleRepository::new(db.clone()));
    let tenants = Arc::new(PostgresTenantRepository::new(db.clone()));

    let identity_config = IdentityConfig::from(settings.as_ref());
    let rate_limiter = Arc::new(RedisRateLimiter::new(kv.clone(), settings.engine.login_rate_limit_per_minute));
    let auth = Arc::new(AuthService::new(users.clone(), tenants.clone(), &identity_config, rate_limiter)?);

    let sse = SseHub::new();
    let shift_cache = ShiftCache::new(kv.clone());
    let shift_router = Arc::new(ShiftRouter::new(shift_cache, shifts.clone(), users.clone()));

    let email_queue = Arc::new(NotificationQueue::new(
        kv.clone(),
        NotificationChannel::Email,
        EmailChannel::new(settings.smtp.clone()),
        Duration::from_secs(30),
    ));
    let sms_queue = Arc::new(NotificationQueue::new(
        kv.clone(),
        NotificationChannel::Sms,
        SmsChannel::new(settings.sms_gateway.clone()),
        Duration::from_secs(30),
    ));

    let audit: Arc<dyn audit_engine::AuditSink> = Arc::new(audit_engine::PostgresAuditSink::new(db.pool().clone()));

    let bus = RedisStreamBus::from_connection_manager(kv.clone());

    let death_listener = Arc::new(DeathListener::new(
        tenants.clone(),
        hospitals.clone(),
        obitos.clone(),
        bus.clone(),
        kv.clone(),
        Duration::from_secs(settings.engine.poll_interval_secs),
    ));

    let triage_motor = Arc::new(triage_motor::TriageMotor::new(
        triage_rules.clone(),
        occurrences.clone(),
        hospitals.clone(),
        bus,
        sse.clone(),
        shift_router.clone(),
        email_queue.clone(),
        sms_queue.clone(),
        audit.clone(),
        "triage-motor-1",
        settings.engine.window_hours,
        settings.engine.dashboard_base_url.clone(),
    ));
    let triage_stats = triage_motor.stats();

    let health = Arc::new(HealthMonitor::new(
        db.clone(),
        kv.clone(),
        sse.clone(),
        triage_stats.clone(),
        EmailChannel::new(settings.smtp.clone()),
        settings.engine.admin_alert_email.clone(),
        Duration::from_secs(settings.engine.check_interval_secs),
        settings.engine.alert_cooldown_minutes,
    ));

    let email_worker = NotificationWorker::new(
        NotificationQueue::new(kv.clone(), NotificationChannel::Email, EmailChannel::new(settings.smtp.clone()), Duration::from_secs(30)),
        Duration::from_secs(2),
    );
    let sms_worker = NotificationWorker::new(
        NotificationQueue::new(kv.clone(), NotificationChannel::Sms, SmsChannel::new(settings.sms_gateway.clone()), Duration::from_secs(30)),
        Duration::from_secs(2),
    );

    let shutdown = tokio_util::sync::CancellationToken::new();

    let mut worker_handles = Vec::new();
    worker_handles.push(tokio::spawn({
        let listener = death_listener.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = listener.run(shutdown).await {
                tracing::error!(error = %e, "death listener stopped with an error");
            }
        }
    }));
    worker_handles.push(tokio::spawn({
        let motor = triage_motor.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = motor.run(shutdown).await {
                tracing::error!(error = %e, "triage motor stopped with an error");
            }
        }
    }));
    worker_handles.push(tokio::spawn({
        let health = health.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = health.run(shutdown).await {
                tracing::error!(error = %e, "health monitor stopped with an error");
            }
        }
    }));
    worker_handles.push(tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = email_worker.run(shutdown).await {
                tracing::error!(error = %e, "email notification worker stopped with an error");
            }
        }
    }));
    worker_handles.push(tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = sms_worker.run(shutdown).await {
                tracing::error!(error = %e, "sms notification worker stopped with an error");
            }
        }
    }));

    let pep_api_keys = Arc::new(settings.engine.pep_api_keys()?);

    let state = AppState {
        settings: settings.clone(),
        db,
        kv,
        sse,
        auth,
        hospitals,
        occurrences,
        shifts,
        users,
        obitos,
        triage_rules,
        shift_router,
        triage_stats,
        health,
        pep_api_keys,
    };

    let cors = build_cors(&settings.engine.cors_origins);
    let app = Router::new()
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "vitalconnect-server listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    for handle in worker_handles {
        let _ = handle.await;
    }

    Ok(())
}

async fn shutdown_signal(shutdown: tokio_util::sync::CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installs on unix")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received, draining workers");
    shutdown.cancel();
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::HeaderName::from_static("x-tenant-context")]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(tower_http::cors::Any);
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(parsed)
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "vitalconnect_server=info,tower_http=info".into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).json())
        .init();
}
