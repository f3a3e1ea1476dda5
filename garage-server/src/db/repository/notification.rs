//! Notification Outbox Repository

use super::RepoResult;
use shared::models::{Notification, TemplateEvent};
use sqlx::{SqliteConnection, SqlitePool};

pub const CHANNEL_WHATSAPP: &str = "whatsapp";
pub const STATUS_QUEUED: &str = "queued";

pub async fn find_all(pool: &SqlitePool, job_id: Option<i64>) -> RepoResult<Vec<Notification>> {
    let rows = sqlx::query_as::<_, Notification>(
        "SELECT id, channel, event, recipient, message, job_id, status, created_at FROM notification WHERE (?1 IS NULL OR job_id = ?1) ORDER BY created_at DESC, id DESC",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Queue a WhatsApp message
pub async fn enqueue(
    conn: &mut SqliteConnection,
    event: TemplateEvent,
    recipient: &str,
    message: &str,
    job_id: Option<i64>,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO notification (id, channel, event, recipient, message, job_id, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(CHANNEL_WHATSAPP)
    .bind(event)
    .bind(recipient)
    .bind(message)
    .bind(job_id)
    .bind(STATUS_QUEUED)
    .bind(shared::util::now_millis())
    .execute(&mut *conn)
    .await?;
    Ok(id)
}
