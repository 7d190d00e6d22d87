use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::Tenant;
use crate::pool::DbPool;

/// Unscoped by design: this is the only lookup in the repository set that
/// runs before a `TenantContext` exists, used by the super-admin
/// `X-Tenant-Context` override (§4.6) to check the requested tenant id is
/// real before granting the switch.
#[async_trait]
pub trait TenantRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Tenant>;

    /// Every tenant, used by workers that sweep across the whole engine
    /// (death listener, health monitor) rather than serving one tenant's
    /// request.
    async fn list_all(&self) -> DatabaseResult<Vec<Tenant>>;
}

pub struct PostgresTenantRepository {
    pool: DbPool,
}

impl PostgresTenantRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantRepository for PostgresTenantRepository {
    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Tenant> {
        sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    async fn list_all(&self) -> DatabaseResult<Vec<Tenant>> {
        let rows = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants")
            .fetch_all(self.pool.pool())
            .await?;

        Ok(rows)
    }
}
