//! Message Template Repository

use super::{RepoError, RepoResult};
use shared::models::{MessageTemplate, TemplateCreate, TemplateEvent, TemplateUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TEMPLATE_SELECT: &str =
    "SELECT id, name, event, body, is_active, created_at, updated_at FROM message_template";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MessageTemplate>> {
    let sql = format!("{TEMPLATE_SELECT} ORDER BY name");
    let rows = sqlx::query_as::<_, MessageTemplate>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<MessageTemplate>> {
    let sql = format!("{TEMPLATE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MessageTemplate>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Most recently updated active template for an event
pub async fn find_active_for_event<'e>(
    ex: impl SqliteExecutor<'e>,
    event: TemplateEvent,
) -> RepoResult<Option<MessageTemplate>> {
    let sql = format!("{TEMPLATE_SELECT} WHERE event = ? AND is_active = 1 ORDER BY updated_at DESC LIMIT 1");
    let row = sqlx::query_as::<_, MessageTemplate>(&sql)
        .bind(event)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: TemplateCreate) -> RepoResult<MessageTemplate> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO message_template (id, name, event, body, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.event)
    .bind(&data.body)
    .bind(data.is_active.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create template".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TemplateUpdate) -> RepoResult<MessageTemplate> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE message_template SET name = COALESCE(?1, name), event = COALESCE(?2, event), body = COALESCE(?3, body), is_active = COALESCE(?4, is_active), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.event)
    .bind(&data.body)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Template {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Template {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM message_template WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::test_pool;

    fn payload(name: &str, active: bool) -> TemplateCreate {
        TemplateCreate {
            name: name.into(),
            event: TemplateEvent::JobCompleted,
            body: "Hi {{customer_name}}".into(),
            is_active: Some(active),
        }
    }

    #[tokio::test]
    async fn active_lookup_skips_disabled_templates() {
        let pool = test_pool().await;
        create(&pool, payload("done-old", false)).await.unwrap();
        let active = create(&pool, payload("done-new", true)).await.unwrap();

        let found = find_active_for_event(&pool, TemplateEvent::JobCompleted)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, active.id);
        assert!(
            find_active_for_event(&pool, TemplateEvent::PaymentReceived)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn names_are_unique() {
        let pool = test_pool().await;
        create(&pool, payload("same", true)).await.unwrap();
        let err = create(&pool, payload("same", true)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
