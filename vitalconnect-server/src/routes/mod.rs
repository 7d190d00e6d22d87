use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod occurrences;
pub mod pep;
pub mod shifts;
pub mod sse;

/// Every route this binary serves (§6), grouped the way §6 groups them.
/// Mounted once in `main` under a single `ServiceBuilder` (trace + CORS).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/occurrences", get(occurrences::list))
        .route("/occurrences/:id", get(occurrences::detail))
        .route("/occurrences/:id/history", get(occurrences::history))
        .route("/occurrences/:id/transition", patch(occurrences::transition))
        .route("/shifts", post(shifts::create))
        .route("/shifts/:id", patch(shifts::update).delete(shifts::delete))
        .route("/shifts/me", get(shifts::mine))
        .route("/hospitals/:id/shifts/today", get(shifts::today))
        .route("/hospitals/:id/shifts/coverage", get(shifts::coverage))
        .route("/health", get(health::health))
        .route("/health/summary", get(health::summary))
        .route("/notifications/stream", get(sse::stream))
        .route("/pep/eventos", post(pep::ingest))
}
