use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use health_monitor::ComponentState;
use serde::Serialize;
use std::collections::HashMap;

use crate::state::AppState;

/// Minimal liveness probe (§6: "minimal 200"). Deliberately doesn't touch
/// the database or KV store — that's what `/health/summary` is for.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthSummary {
    status: String,
    timestamp: DateTime<Utc>,
    components: HashMap<String, ComponentState>,
}

pub async fn summary(State(state): State<AppState>) -> Json<HealthSummary> {
    match state.health.snapshot() {
        Some(snapshot) => Json(HealthSummary {
            status: snapshot.overall.to_string(),
            timestamp: snapshot.checked_at,
            components: snapshot.components,
        }),
        None => Json(HealthSummary {
            status: "UNKNOWN".to_string(),
            timestamp: Utc::now(),
            components: HashMap::new(),
        }),
    }
}
