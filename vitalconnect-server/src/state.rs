use std::collections::HashMap;
use std::sync::Arc;

use auth_identity::AuthService;
use config_engine::{PepCredential, Settings};
use database_layer::{
    DbPool, HospitalRepository, ObitoRepository, OccurrenceRepository, ShiftRepository,
    TriageRuleRepository, UserRepository,
};
use health_monitor::HealthMonitor;
use redis::aio::ConnectionManager;
use shift_routing::ShiftRouter;
use sse_hub::SseHub;
use triage_motor::TriageStats;

/// Every collaborator the HTTP layer needs, constructed once in `main` and
/// shared via `axum::extract::State` (§9: explicit DI, no globals). Workers
/// (death listener, triage motor, health monitor) hold their own clones of
/// whichever of these they need and run independently of this struct.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub db: DbPool,
    pub kv: ConnectionManager,
    pub sse: SseHub,
    pub auth: Arc<AuthService>,
    pub hospitals: Arc<dyn HospitalRepository>,
    pub occurrences: Arc<dyn OccurrenceRepository>,
    pub shifts: Arc<dyn ShiftRepository>,
    pub users: Arc<dyn UserRepository>,
    pub obitos: Arc<dyn ObitoRepository>,
    pub triage_rules: Arc<dyn TriageRuleRepository>,
    pub shift_router: Arc<ShiftRouter>,
    pub triage_stats: Arc<TriageStats>,
    pub health: Arc<HealthMonitor>,
    pub pep_api_keys: Arc<HashMap<String, PepCredential>>,
}
