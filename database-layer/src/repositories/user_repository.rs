use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{User, UserRole};
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Looked up without a `TenantContext` — this is the pre-authentication
    /// path (login), so tenant is implied by the email's own row, not by an
    /// existing session.
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<User>;

    /// Active `gestor`s for a hospital, used by the shift-routing mandatory
    /// fallback (§4.3 step 4).
    async fn find_active_by_hospital_and_role(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        role: UserRole,
    ) -> DatabaseResult<Vec<User>>;

    /// Users with active memberships in any of `shift_user_ids`, filtered to
    /// `is_active`, used to resolve the notification recipient set after a
    /// shift lookup returns user ids.
    async fn find_active_by_ids(&self, ctx: &TenantContext, user_ids: &[Uuid]) -> DatabaseResult<Vec<User>>;
}

pub struct PostgresUserRepository {
    pool: DbPool,
}

impl PostgresUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool.pool())
            .await?;

        Ok(row)
    }

    async fn find_by_id(&self, ctx: &TenantContext, id: Uuid) -> DatabaseResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE tenant_id = $1 AND id = $2")
            .bind(ctx.tenant_id)
            .bind(id)
            .fetch_optional(self.pool.pool())
            .await?
            .ok_or(DatabaseError::NotFound)
    }

    async fn find_active_by_hospital_and_role(
        &self,
        ctx: &TenantContext,
        hospital_id: Uuid,
        role: UserRole,
    ) -> DatabaseResult<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN user_hospitals uh ON uh.user_id = u.id
            WHERE u.tenant_id = $1 AND uh.hospital_id = $2 AND u.role = $3 AND u.is_active = true
            "#,
        )
        .bind(ctx.tenant_id)
        .bind(hospital_id)
        .bind(role)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn find_active_by_ids(&self, ctx: &TenantContext, user_ids: &[Uuid]) -> DatabaseResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 AND id = ANY($2) AND is_active = true",
        )
        .bind(ctx.tenant_id)
        .bind(user_ids)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }
}
