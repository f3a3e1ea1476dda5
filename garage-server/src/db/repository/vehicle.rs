//! Vehicle Repository

use super::{RepoError, RepoResult};
use shared::models::{Vehicle, VehicleCreate, VehicleUpdate};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

pub(crate) const VEHICLE_SELECT: &str = "SELECT id, customer_id, make, model, year, color, plate_number, vin, vehicle_type, ppf_category, ppf_variant, ppf_warranty_years, ppf_quoted_price, created_at, updated_at FROM vehicle";

pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Vehicle>> {
    let sql = format!("{VEHICLE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Vehicle>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_by_customer<'e>(
    ex: impl SqliteExecutor<'e>,
    customer_id: i64,
) -> RepoResult<Vec<Vehicle>> {
    let sql = format!("{VEHICLE_SELECT} WHERE customer_id = ? ORDER BY created_at");
    let rows = sqlx::query_as::<_, Vehicle>(&sql)
        .bind(customer_id)
        .fetch_all(ex)
        .await?;
    Ok(rows)
}

/// Insert a vehicle inside an open transaction, returning its id
pub async fn insert(
    conn: &mut SqliteConnection,
    customer_id: i64,
    data: &VehicleCreate,
) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO vehicle (id, customer_id, make, model, year, color, plate_number, vin, vehicle_type, ppf_category, ppf_variant, ppf_warranty_years, ppf_quoted_price, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(&data.make)
    .bind(&data.model)
    .bind(data.year)
    .bind(&data.color)
    .bind(&data.plate_number)
    .bind(&data.vin)
    .bind(&data.vehicle_type)
    .bind(&data.ppf_category)
    .bind(&data.ppf_variant)
    .bind(data.ppf_warranty_years)
    .bind(data.ppf_quoted_price)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn create(pool: &SqlitePool, customer_id: i64, data: VehicleCreate) -> RepoResult<Vehicle> {
    let mut conn = pool.acquire().await?;
    let id = insert(&mut conn, customer_id, &data).await?;
    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create vehicle".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: VehicleUpdate) -> RepoResult<Vehicle> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE vehicle SET make = COALESCE(?1, make), model = COALESCE(?2, model), year = COALESCE(?3, year), color = COALESCE(?4, color), plate_number = COALESCE(?5, plate_number), vin = COALESCE(?6, vin), vehicle_type = COALESCE(?7, vehicle_type), ppf_category = COALESCE(?8, ppf_category), ppf_variant = COALESCE(?9, ppf_variant), ppf_warranty_years = COALESCE(?10, ppf_warranty_years), ppf_quoted_price = COALESCE(?11, ppf_quoted_price), updated_at = ?12 WHERE id = ?13",
    )
    .bind(&data.make)
    .bind(&data.model)
    .bind(data.year)
    .bind(&data.color)
    .bind(&data.plate_number)
    .bind(&data.vin)
    .bind(&data.vehicle_type)
    .bind(&data.ppf_category)
    .bind(&data.ppf_variant)
    .bind(data.ppf_warranty_years)
    .bind(data.ppf_quoted_price)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Vehicle {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Vehicle {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM vehicle WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::{seed_customer, test_pool};

    #[tokio::test]
    async fn ppf_preferences_round_trip_and_patch() {
        let pool = test_pool().await;
        let customer = seed_customer(&pool, "9000000001").await;

        let vehicle = create(
            &pool,
            customer.id,
            VehicleCreate {
                make: "BMW".into(),
                model: "X1".into(),
                ppf_category: Some("gloss".into()),
                ppf_variant: Some("premium".into()),
                ppf_warranty_years: Some(5),
                ppf_quoted_price: Some(120000.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(vehicle.has_ppf_preference());

        let updated = update(
            &pool,
            vehicle.id,
            VehicleUpdate {
                color: Some("Alpine White".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.color.as_deref(), Some("Alpine White"));
        assert_eq!(updated.ppf_warranty_years, Some(5));

        let all = find_by_customer(&pool, customer.id).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn update_missing_vehicle_is_not_found() {
        let pool = test_pool().await;
        let err = update(&pool, 42, VehicleUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
