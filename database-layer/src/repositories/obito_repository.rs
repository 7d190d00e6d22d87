use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::Obito;
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

/// A death event normalized from an external feed, ready to be persisted as
/// an `obitos` row (§6: "PEP ingest ... normalized into an obito row"). The
/// PEP endpoint resolves `hospital_id` from its API key mapping, not from a
/// logged-in user, so this is plain data rather than a `TenantContext` call.
#[derive(Debug, Clone)]
pub struct NewObito {
    pub tenant_id: Uuid,
    pub hospital_id: Uuid,
    pub masked_patient_name: String,
    pub unmasked_patient_name: String,
    pub birth_date: NaiveDate,
    pub death_at: DateTime<Utc>,
    pub cause_of_death: Option<String>,
    pub sector: Option<String>,
    pub bed: Option<String>,
    pub is_unidentified: bool,
}

/// The death listener owns the read/mark-processed pair; everything else
/// reads obits through [`crate::OccurrenceRepository`].
#[async_trait]
pub trait ObitoRepository: Send + Sync {
    /// Unprocessed records for `hospital_id` with `death_at` within `since`.
    /// Used by the poller to bound each poll tick (§4.1: "within the last
    /// 24h").
    async fn find_unprocessed_since(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        since: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Obito>>;

    /// Re-reads a single record's `processed` flag for the idempotency
    /// re-check in §4.1 step 1.
    async fn is_processed(&self, ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<bool>;

    /// Flips `processed` to true. Called after the event has been published
    /// to the stream, never before (§4.1: publication precedes flagging).
    async fn mark_processed(&self, ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<()>;

    /// Inserts a new, unprocessed obito row from a normalized PEP payload
    /// (§6). Left unflagged so the listener's own poll picks it up and
    /// drives materialization through the normal §4.1/§4.2 path.
    async fn create(&self, new_obito: NewObito) -> DatabaseResult<Obito>;
}

pub struct PostgresObitoRepository {
    pool: DbPool,
}

impl PostgresObitoRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ObitoRepository for PostgresObitoRepository {
    async fn find_unprocessed_since(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        since: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Obito>> {
        let rows = sqlx::query_as::<_, Obito>(
            r#"
            SELECT * FROM obitos
            WHERE tenant_id = $1 AND hospital_id = $2
              AND processed = false AND death_at >= $3
            ORDER BY death_at ASC
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .bind(since)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn is_processed(&self, ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<bool> {
        let processed: Option<bool> =
            sqlx::query_scalar("SELECT processed FROM obitos WHERE tenant_id = $1 AND id = $2")
                .bind(ctx.tenant_id)
                .bind(obito_id)
                .fetch_optional(self.pool.pool())
                .await?;

        Ok(processed.unwrap_or(true))
    }

    async fn mark_processed(&self, ctx: &TenantContext, obito_id: Uuid) -> DatabaseResult<()> {
        sqlx::query("UPDATE obitos SET processed = true WHERE tenant_id = $1 AND id = $2")
            .bind(ctx.tenant_id)
            .bind(obito_id)
            .execute(self.pool.pool())
            .await?;

        Ok(())
    }

    async fn create(&self, new_obito: NewObito) -> DatabaseResult<Obito> {
        let obito = sqlx::query_as::<_, Obito>(
            r#"
            INSERT INTO obitos
                (id, tenant_id, hospital_id, masked_patient_name, unmasked_patient_name,
                 birth_date, death_at, cause_of_death, sector, bed, is_unidentified, processed, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, false, now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_obito.tenant_id)
        .bind(new_obito.hospital_id)
        .bind(new_obito.masked_patient_name)
        .bind(new_obito.unmasked_patient_name)
        .bind(new_obito.birth_date)
        .bind(new_obito.death_at)
        .bind(new_obito.cause_of_death)
        .bind(new_obito.sector)
        .bind(new_obito.bed)
        .bind(new_obito.is_unidentified)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(obito)
    }
}
