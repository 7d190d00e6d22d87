use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Occurrence, OccurrenceHistoryEntry, OccurrenceStatus, OutcomeKind};
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

#[async_trait]
pub trait OccurrenceRepository: Send + Sync {
    /// Inserts a new PENDENTE occurrence, or returns the existing one if an
    /// occurrence for `(tenant, obito)` already exists (§4.2 idempotent
    /// materialization, enforced by a unique constraint on `(obito_id,
    /// tenant_id)`).
    async fn create_if_absent(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        obito_id: Uuid,
        priority_score: i32,
        masked_patient_name: String,
        clinical_payload: serde_json::Value,
        death_at: DateTime<Utc>,
        window_expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Occurrence>;

    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Occurrence>;

    /// Applies a status transition and appends a history entry in the same
    /// transaction. Rejects the call outright if the current status is
    /// terminal (§4.2: CANCELADA/CONCLUIDA are absorbing).
    async fn transition_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        actor: Option<Uuid>,
        new_status: OccurrenceStatus,
        outcome: Option<OutcomeKind>,
    ) -> DatabaseResult<Occurrence>;

    /// PENDENTE occurrences whose window has expired as of `now`, for the
    /// window-expiry sweeper (§4.2, runs every minute).
    async fn find_expired_pending(
        &self,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Vec<Occurrence>>;

    async fn mark_first_notified(&self, ctx: &TenantContext, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()>;

    async fn history(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Vec<OccurrenceHistoryEntry>>;

    /// Filtered, paged listing for the occurrence list endpoint (§6). All
    /// filters are optional and AND together; results are newest-first.
    async fn list(&self, ctx: &TenantContext, filter: &OccurrenceFilter) -> DatabaseResult<Vec<Occurrence>>;
}

/// Optional filters for [`OccurrenceRepository::list`]; `None` means
/// unfiltered on that dimension. `offset`/`limit` page the newest-first
/// result set.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceFilter {
    pub status: Option<OccurrenceStatus>,
    pub hospital_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

pub struct PostgresOccurrenceRepository {
    pool: DbPool,
}

impl PostgresOccurrenceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OccurrenceRepository for PostgresOccurrenceRepository {
    async fn create_if_absent(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        obito_id: Uuid,
        priority_score: i32,
        masked_patient_name: String,
        clinical_payload: serde_json::Value,
        death_at: DateTime<Utc>,
        window_expires_at: DateTime<Utc>,
    ) -> DatabaseResult<Occurrence> {
        if let Some(existing) = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM occurrences WHERE tenant_id = $1 AND obito_id = $2",
        )
        .bind(ctx.tenant_id)
        .bind(obito_id)
        .fetch_optional(self.pool.pool())
        .await?
        {
            return Ok(existing);
        }

        let mut tx = self.pool.pool().begin().await?;

        let occurrence = sqlx::query_as::<_, Occurrence>(
            r#"
            INSERT INTO occurrences
                (id, tenant_id, hospital_id, obito_id, status, priority_score,
                 masked_patient_name, clinical_payload, death_at, window_expires_at,
                 first_notified_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'PENDENTE', $5, $6, $7, $8, $9, NULL, now(), now())
            ON CONFLICT (tenant_id, obito_id) DO UPDATE SET updated_at = occurrences.updated_at
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .bind(obito_id)
        .bind(priority_score)
        .bind(masked_patient_name)
        .bind(clinical_payload)
        .bind(death_at)
        .bind(window_expires_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO occurrence_history (id, occurrence_id, actor, before_status, after_status, outcome, created_at)
            VALUES ($1, $2, NULL, NULL, 'PENDENTE', NULL, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(occurrence.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(occurrence)
    }

    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Occurrence> {
        sqlx::query_as::<_, Occurrence>("SELECT * FROM occurrences WHERE tenant_id = $1 AND id = $2")
            .bind(ctx.tenant_id)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    async fn transition_status(
        &self,
        ctx: &TenantContext,
        id: Uuid,
        actor: Option<Uuid>,
        new_status: OccurrenceStatus,
        outcome: Option<OutcomeKind>,
    ) -> DatabaseResult<Occurrence> {
        let mut tx = self.pool.pool().begin().await?;

        let current = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM occurrences WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(ctx.tenant_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DatabaseError::NotFound)?;

        if current.status.is_terminal() {
            return Err(DatabaseError::Conflict(format!(
                "occurrence {id} is already in terminal status {:?}",
                current.status
            )));
        }

        let updated = sqlx::query_as::<_, Occurrence>(
            "UPDATE occurrences SET status = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(new_status)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO occurrence_history (id, occurrence_id, actor, before_status, after_status, outcome, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(id)
        .bind(actor)
        .bind(current.status)
        .bind(new_status)
        .bind(outcome)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn find_expired_pending(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<Occurrence>> {
        let rows = sqlx::query_as::<_, Occurrence>(
            "SELECT * FROM occurrences WHERE status = 'PENDENTE' AND window_expires_at <= $1",
        )
        .bind(now)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn mark_first_notified(&self, ctx: &TenantContext, id: Uuid, at: DateTime<Utc>) -> DatabaseResult<()> {
        sqlx::query(
            "UPDATE occurrences SET first_notified_at = $1 WHERE tenant_id = $2 AND id = $3 AND first_notified_at IS NULL",
        )
        .bind(at)
        .bind(ctx.tenant_id)
        .bind(id)
        .execute(self.pool.pool())
        .await?;

        Ok(())
    }

    async fn history(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Vec<OccurrenceHistoryEntry>> {
        let rows = sqlx::query_as::<_, OccurrenceHistoryEntry>(
            r#"
            SELECT h.* FROM occurrence_history h
            JOIN occurrences o ON o.id = h.occurrence_id
            WHERE o.tenant_id = $1 AND h.occurrence_id = $2
            ORDER BY h.created_at ASC
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn list(&self, ctx: &TenantContext, filter: &OccurrenceFilter) -> DatabaseResult<Vec<Occurrence>> {
        let rows = sqlx::query_as::<_, Occurrence>(
            r#"
            SELECT * FROM occurrences
            WHERE tenant_id = $1
              AND ($2::text IS NULL OR status = $2)
              AND ($3::uuid IS NULL OR hospital_id = $3)
              AND ($4::timestamptz IS NULL OR death_at >= $4)
              AND ($5::timestamptz IS NULL OR death_at <= $5)
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(filter.status)
        .bind(filter.hospital_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }
}
