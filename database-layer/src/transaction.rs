use std::future::Future;

use sqlx::{Postgres, Transaction};

use crate::error::DatabaseResult;
use crate::pool::DbPool;

/// Runs `f` inside a single Postgres transaction and commits on success,
/// rolling back if `f` returns an error. Occurrence status transitions
/// (§5's ordering guarantee) always go through this so a failed
/// notification enqueue can't leave a half-applied status change.
pub async fn with_transaction<F, Fut, T>(pool: &DbPool, f: F) -> DatabaseResult<T>
where
    F: FnOnce(Transaction<'_, Postgres>) -> Fut,
    Fut: Future<Output = DatabaseResult<(Transaction<'_, Postgres>, T)>>,
{
    let tx = pool.pool().begin().await?;
    let (tx, value) = f(tx).await?;
    tx.commit().await?;
    Ok(value)
}
