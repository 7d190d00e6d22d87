use async_trait::async_trait;
use chrono::NaiveTime;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::Shift;
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

#[async_trait]
pub trait ShiftRepository: Send + Sync {
    /// All active shifts for `hospital_id` on `weekday` (Sunday = 0), used
    /// by `shift-routing` before it applies the time-of-day predicate
    /// itself (§4.3 step 2).
    async fn find_active_by_hospital_weekday(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        weekday: i16,
    ) -> DatabaseResult<Vec<Shift>>;

    /// All active shifts for the hospital across every weekday, used by the
    /// coverage-gap analysis (§4.3 "Coverage analysis").
    async fn find_active_by_hospital(&self, ctx: &TenantContext, hospital_id: Uuid) -> DatabaseResult<Vec<Shift>>;

    /// All active shifts owned by `ctx.user_id`, for `GET /shifts/me` (§6).
    async fn find_active_by_user(&self, ctx: &TenantContext, user_id: Uuid) -> DatabaseResult<Vec<Shift>>;

    async fn create(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift>;

    /// Updates an existing shift's assignment/time window (§6: "CRUD on
    /// shifts"). Doesn't move the shift to a different hospital — the
    /// caller deletes and recreates for that.
    async fn update(
        &self,
        ctx: &TenantContext,
        shift_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift>;

    /// Deletes a shift and returns the row that was removed, so callers can
    /// invalidate that hospital's routing cache (§4.3: "Cache
    /// invalidation") without a separate lookup.
    async fn delete(&self, ctx: &TenantContext, shift_id: Uuid) -> DatabaseResult<Shift>;
}

pub struct PostgresShiftRepository {
    pool: DbPool,
}

impl PostgresShiftRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShiftRepository for PostgresShiftRepository {
    async fn find_active_by_hospital_weekday(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        weekday: i16,
    ) -> DatabaseResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(
            r#"
            SELECT * FROM shifts
            WHERE tenant_id = $1 AND hospital_id = $2 AND weekday = $3 AND is_active = true
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .bind(weekday)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn find_active_by_hospital(&self, ctx: &TenantContext, hospital_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(
            "SELECT * FROM shifts WHERE tenant_id = $1 AND hospital_id = $2 AND is_active = true",
        )
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn find_active_by_user(&self, ctx: &TenantContext, user_id: Uuid) -> DatabaseResult<Vec<Shift>> {
        let rows = sqlx::query_as::<_, Shift>(
            "SELECT * FROM shifts WHERE tenant_id = $1 AND user_id = $2 AND is_active = true",
        )
        .bind(ctx.tenant_id)
        .bind(user_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn create(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            INSERT INTO shifts (id, tenant_id, hospital_id, user_id, weekday, start_time, end_time, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, true)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .bind(user_id)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(shift)
    }

    async fn update(
        &self,
        ctx: &TenantContext,
        shift_id: Uuid,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> DatabaseResult<Shift> {
        let shift = sqlx::query_as::<_, Shift>(
            r#"
            UPDATE shifts
            SET user_id = $1, weekday = $2, start_time = $3, end_time = $4
            WHERE tenant_id = $5 AND id = $6
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .bind(ctx.tenant_id)
        .bind(shift_id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)?;

        Ok(shift)
    }

    async fn delete(&self, ctx: &TenantContext, shift_id: Uuid) -> DatabaseResult<Shift> {
        let shift = sqlx::query_as::<_, Shift>("DELETE FROM shifts WHERE tenant_id = $1 AND id = $2 RETURNING *")
            .bind(ctx.tenant_id)
            .bind(shift_id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(DatabaseError::NotFound)?;

        Ok(shift)
    }
}
