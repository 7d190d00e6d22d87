use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseResult;
use crate::models::TriageRule;
use crate::pool::DbPool;
use crate::tenant_context::TenantContext;

#[async_trait]
pub trait TriageRuleRepository: Send + Sync {
    /// Active rules for the tenant, sorted descending by priority (§4.2:
    /// "sorted descending by priority, and evaluated in order").
    async fn find_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<TriageRule>>;

    async fn create(&self, ctx: &TenantContext, rule: TriageRule) -> DatabaseResult<TriageRule>;
}

pub struct PostgresTriageRuleRepository {
    pool: DbPool,
}

impl PostgresTriageRuleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TriageRuleRepository for PostgresTriageRuleRepository {
    async fn find_active_by_tenant(&self, ctx: &TenantContext) -> DatabaseResult<Vec<TriageRule>> {
        let rows = sqlx::query_as::<_, TriageRule>(
            r#"
            SELECT * FROM triage_rules
            WHERE tenant_id = $1 AND is_active = true
            ORDER BY priority DESC
            "#,
        )
        .bind(ctx.tenant_id)
        .fetch_all(self.pool.pool())
        .await?;

        Ok(rows)
    }

    async fn create(&self, ctx: &TenantContext, rule: TriageRule) -> DatabaseResult<TriageRule> {
        let created = sqlx::query_as::<_, TriageRule>(
            r#"
            INSERT INTO triage_rules
                (id, tenant_id, name, description, priority, is_active, kind, action, parameters, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ctx.tenant_id)
        .bind(rule.name)
        .bind(rule.description)
        .bind(rule.priority)
        .bind(rule.is_active)
        .bind(rule.kind)
        .bind(rule.action)
        .bind(rule.parameters)
        .fetch_one(self.pool.pool())
        .await?;

        Ok(created)
    }
}
