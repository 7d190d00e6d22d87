use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{Obito, NewObito};
use serde::Deserialize;

use crate::error::{invalid_api_key, ApiError};
use crate::state::AppState;

const API_KEY_HEADER: &str = "X-API-Key";

/// A death event as PEP reports it (§6: "payload is a death event,
/// normalized into an obito row"). `tenant_id`/`hospital_id` aren't part of
/// the body: they come from the API key lookup, never from a field the
/// caller could forge.
#[derive(Debug, Deserialize)]
pub struct PepEventRequest {
    pub patient_name: String,
    pub birth_date: NaiveDate,
    pub death_at: DateTime<Utc>,
    #[serde(default)]
    pub cause_of_death: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub bed: Option<String>,
    #[serde(default)]
    pub is_unidentified: bool,
}

/// Ingests one external death event (§6). The API key resolves a static
/// `(tenant_id, hospital_id)` pair; the listener's own poll picks the new
/// row up and drives it through the normal §4.1/§4.2 path, so this handler
/// only normalizes and inserts.
pub async fn ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PepEventRequest>,
) -> Result<Json<Obito>, ApiError> {
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).ok_or_else(invalid_api_key)?;

    let credential = *state.pep_api_keys.get(api_key).ok_or_else(invalid_api_key)?;

    let new_obito = NewObito {
        tenant_id: credential.tenant_id,
        hospital_id: credential.hospital_id,
        masked_patient_name: Obito::mask_name(&request.patient_name),
        unmasked_patient_name: request.patient_name,
        birth_date: request.birth_date,
        death_at: request.death_at,
        cause_of_death: request.cause_of_death,
        sector: request.sector,
        bed: request.bed,
        is_unidentified: request.is_unidentified,
    };

    let obito = state.obitos.create(new_obito).await.map_err(|e| ApiError(e.into()))?;
    Ok(Json(obito))
}
