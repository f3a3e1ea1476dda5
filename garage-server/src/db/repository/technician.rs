//! Technician Repository

use super::{RepoError, RepoResult};
use shared::models::{Technician, TechnicianCreate, TechnicianUpdate};
use sqlx::{SqliteExecutor, SqlitePool};

const TECHNICIAN_SELECT: &str =
    "SELECT id, name, phone, email, specialty, is_active, created_at, updated_at FROM technician";

/// Active technicians unless `include_inactive` is set
pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Technician>> {
    let sql = if include_inactive {
        format!("{TECHNICIAN_SELECT} ORDER BY name")
    } else {
        format!("{TECHNICIAN_SELECT} WHERE is_active = 1 ORDER BY name")
    };
    let rows = sqlx::query_as::<_, Technician>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Technician>> {
    let sql = format!("{TECHNICIAN_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Technician>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: TechnicianCreate) -> RepoResult<Technician> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO technician (id, name, phone, email, specialty, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.specialty)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create technician".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: TechnicianUpdate) -> RepoResult<Technician> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE technician SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), email = COALESCE(?3, email), specialty = COALESCE(?4, specialty), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.phone)
    .bind(&data.email)
    .bind(&data.specialty)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Technician {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Technician {id} not found")))
}

/// Soft delete: job history keeps pointing at the technician
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE technician SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::test_pool;

    fn payload(name: &str) -> TechnicianCreate {
        TechnicianCreate {
            name: name.into(),
            phone: None,
            email: None,
            specialty: Some("ppf".into()),
        }
    }

    #[tokio::test]
    async fn soft_delete_hides_from_default_list() {
        let pool = test_pool().await;
        let a = create(&pool, payload("Arjun")).await.unwrap();
        create(&pool, payload("Bala")).await.unwrap();
        assert!(a.is_active);

        assert!(delete(&pool, a.id).await.unwrap());
        assert!(!delete(&pool, a.id).await.unwrap());

        let active = find_all(&pool, false).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Bala");
        assert_eq!(find_all(&pool, true).await.unwrap().len(), 2);

        let kept = find_by_id(&pool, a.id).await.unwrap().unwrap();
        assert!(!kept.is_active);
    }

    #[tokio::test]
    async fn update_can_reactivate() {
        let pool = test_pool().await;
        let t = create(&pool, payload("Chandru")).await.unwrap();
        delete(&pool, t.id).await.unwrap();
        let t = update(
            &pool,
            t.id,
            TechnicianUpdate {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(t.is_active);
        assert_eq!(t.specialty.as_deref(), Some("ppf"));
    }
}
