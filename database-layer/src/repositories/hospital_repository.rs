use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::Hospital;
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

#[async_trait]
pub trait HospitalRepository: Send + Sync {
    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Hospital>;

    /// Excludes soft-deleted hospitals, per §3: "Soft-deleted hospitals are
    /// excluded from routing and map queries."
    async fn list_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<Hospital>>;
}

pub struct PostgresHospitalRepository {
    pool: DbPool,
}

impl PostgresHospitalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HospitalRepository for PostgresHospitalRepository {
    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<Hospital> {
        sqlx::query_as::<_, Hospital>(
            "SELECT * FROM hospitals WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(ctx.tenant_id)
        .bind(id)
        .fetch_optional(self.pool.pool())
        .await?
        .ok_or(DatabaseError::NotFound)
    }

    async fn list_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<Hospital>> {
        let rows = sqlx::query_as::<_, Hospital>(
            "SELECT * FROM hospitals WHERE tenant_id = $1 AND is_active = true AND deleted_at IS NULL",
        )
        .bind(ctx.tenant_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }
}
