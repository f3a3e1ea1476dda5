//! Price Inquiry Repository

use super::{RepoError, RepoResult};
use shared::models::{InquiryCreate, InquiryStatus, InquiryUpdate, PriceInquiry};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const INQUIRY_SELECT: &str = "SELECT id, name, phone, email, vehicle_make, vehicle_model, service_type, message, quoted_price, status, customer_id, created_at, updated_at FROM price_inquiry";

pub async fn find_all(pool: &SqlitePool, status: Option<InquiryStatus>) -> RepoResult<Vec<PriceInquiry>> {
    let sql = format!("{INQUIRY_SELECT} WHERE (?1 IS NULL OR status = ?1) ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, PriceInquiry>(&sql)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<PriceInquiry>> {
    let sql = format!("{INQUIRY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, PriceInquiry>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: InquiryCreate) -> RepoResult<PriceInquiry> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO price_inquiry (id, name, phone, email, vehicle_make, vehicle_model, service_type, message, quoted_price, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.phone.trim())
    .bind(&data.email)
    .bind(&data.vehicle_make)
    .bind(&data.vehicle_model)
    .bind(data.service_type.trim())
    .bind(&data.message)
    .bind(data.quoted_price)
    .bind(InquiryStatus::New)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inquiry".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: InquiryUpdate) -> RepoResult<PriceInquiry> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE price_inquiry SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), email = COALESCE(?3, email), vehicle_make = COALESCE(?4, vehicle_make), vehicle_model = COALESCE(?5, vehicle_model), service_type = COALESCE(?6, service_type), message = COALESCE(?7, message), quoted_price = COALESCE(?8, quoted_price), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone.as_deref().map(str::trim))
    .bind(&data.email)
    .bind(&data.vehicle_make)
    .bind(&data.vehicle_model)
    .bind(data.service_type.as_deref().map(str::trim))
    .bind(&data.message)
    .bind(data.quoted_price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Inquiry {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inquiry {id} not found")))
}

pub async fn set_status<'e>(ex: impl SqliteExecutor<'e>, id: i64, status: InquiryStatus) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE price_inquiry SET status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(ex)
        .await?;
    Ok(())
}

/// Mark converted and link the customer
pub async fn link_customer(conn: &mut SqliteConnection, id: i64, customer_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE price_inquiry SET status = ?1, customer_id = ?2, updated_at = ?3 WHERE id = ?4")
        .bind(InquiryStatus::Converted)
        .bind(customer_id)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM price_inquiry WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::test_pool;

    fn lead(phone: &str) -> InquiryCreate {
        InquiryCreate {
            name: "Meera".into(),
            phone: phone.into(),
            email: None,
            vehicle_make: Some("Kia".into()),
            vehicle_model: Some("Seltos".into()),
            service_type: "ppf_full".into(),
            message: Some("Price for full body matte?".into()),
            quoted_price: None,
        }
    }

    #[tokio::test]
    async fn status_filter_and_quote_update() {
        let pool = test_pool().await;
        let a = create(&pool, lead("9700000001")).await.unwrap();
        create(&pool, lead("9700000002")).await.unwrap();
        assert_eq!(a.status, InquiryStatus::New);

        set_status(&pool, a.id, InquiryStatus::Quoted).await.unwrap();
        let a = update(
            &pool,
            a.id,
            InquiryUpdate {
                quoted_price: Some(95000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(a.quoted_price, Some(95000.0));

        let quoted = find_all(&pool, Some(InquiryStatus::Quoted)).await.unwrap();
        assert_eq!(quoted.len(), 1);
        assert_eq!(find_all(&pool, None).await.unwrap().len(), 2);
    }
}
