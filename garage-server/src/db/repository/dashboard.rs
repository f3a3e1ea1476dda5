//! Dashboard aggregates

use super::RepoResult;
use sqlx::SqliteExecutor;

/// Jobs that are neither completed nor cancelled
pub async fn count_active_jobs<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job WHERE stage NOT IN ('completed', 'cancelled')",
    )
    .fetch_one(ex)
    .await?;
    Ok(count)
}

pub async fn count_completed_since<'e>(ex: impl SqliteExecutor<'e>, since: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job WHERE stage = 'completed' AND completed_at >= ?",
    )
    .bind(since)
    .fetch_one(ex)
    .await?;
    Ok(count)
}

pub async fn revenue_collected<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<f64> {
    let sum = sqlx::query_scalar::<_, f64>("SELECT COALESCE(SUM(amount), 0.0) FROM job_payment")
        .fetch_one(ex)
        .await?;
    Ok(sum)
}

pub async fn outstanding_balance<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<f64> {
    let sum = sqlx::query_scalar::<_, f64>(
        "SELECT COALESCE(SUM(balance), 0.0) FROM job WHERE stage != 'cancelled'",
    )
    .fetch_one(ex)
    .await?;
    Ok(sum)
}
