use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::DatabaseResult;

/// Thin wrapper over `sqlx::PgPool` built with the bounds from §5: 25 open
/// connections, 5 kept idle, 5 minute max connection lifetime.
#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    pub async fn connect(database_url: &str) -> DatabaseResult<Self> {
        Self::connect_with(database_url, 25, 5, Duration::from_secs(300)).await
    }

    pub async fn connect_with(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        max_lifetime: Duration,
    ) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .max_lifetime(max_lifetime)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
