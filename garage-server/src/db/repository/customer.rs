//! Customer Repository

use std::collections::HashMap;

use super::vehicle::{self, VEHICLE_SELECT};
use super::{RepoError, RepoResult};
use shared::models::{Customer, CustomerCreate, CustomerUpdate, Vehicle};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const CUSTOMER_SELECT: &str =
    "SELECT id, name, phone, email, address, notes, created_at, updated_at FROM customer";

const SEARCH_FILTER: &str = "(name LIKE ?1 OR phone LIKE ?1 OR EXISTS (SELECT 1 FROM vehicle v WHERE v.customer_id = customer.id AND v.plate_number LIKE ?1))";

/// List customers (newest first) with their vehicles, optionally filtered by
/// name, phone or plate number
pub async fn find_all(pool: &SqlitePool, query: Option<&str>) -> RepoResult<Vec<Customer>> {
    let mut customers = match query.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let sql = format!("{CUSTOMER_SELECT} WHERE {SEARCH_FILTER} ORDER BY created_at DESC");
            sqlx::query_as::<_, Customer>(&sql)
                .bind(format!("%{q}%"))
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{CUSTOMER_SELECT} ORDER BY created_at DESC");
            sqlx::query_as::<_, Customer>(&sql).fetch_all(pool).await?
        }
    };

    if customers.is_empty() {
        return Ok(customers);
    }

    let vehicles = sqlx::query_as::<_, Vehicle>(&format!("{VEHICLE_SELECT} ORDER BY created_at"))
        .fetch_all(pool)
        .await?;
    let mut by_customer: HashMap<i64, Vec<Vehicle>> = HashMap::new();
    for v in vehicles {
        by_customer.entry(v.customer_id).or_default().push(v);
    }
    for c in &mut customers {
        c.vehicles = by_customer.remove(&c.id).unwrap_or_default();
    }
    Ok(customers)
}

/// Customer row without vehicles
pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

pub async fn find_by_phone<'e>(
    ex: impl SqliteExecutor<'e>,
    phone: &str,
) -> RepoResult<Option<Customer>> {
    let sql = format!("{CUSTOMER_SELECT} WHERE phone = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(phone.trim())
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Customer with vehicles
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let Some(mut customer) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    customer.vehicles = vehicle::find_by_customer(pool, id).await?;
    Ok(Some(customer))
}

/// Insert a customer and its initial vehicles inside an open transaction
pub async fn insert(conn: &mut SqliteConnection, data: &CustomerCreate) -> RepoResult<i64> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO customer (id, name, phone, email, address, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.phone.trim())
    .bind(&data.email)
    .bind(&data.address)
    .bind(&data.notes)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    for v in &data.vehicles {
        vehicle::insert(conn, id, v).await?;
    }
    Ok(id)
}

pub async fn create(pool: &SqlitePool, data: CustomerCreate) -> RepoResult<Customer> {
    let mut tx = pool.begin_with(crate::db::BEGIN_WRITE).await?;
    let id = insert(&mut tx, &data).await?;
    tx.commit().await?;
    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CustomerUpdate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), email = COALESCE(?3, email), address = COALESCE(?4, address), notes = COALESCE(?5, notes), updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.phone.as_deref().map(str::trim))
    .bind(&data.email)
    .bind(&data.address)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_detail(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

/// Hard delete; vehicles cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM customer WHERE id = ?")
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
    async fn create_with_vehicles_and_search_by_plate() {
        let pool = test_pool().await;
        let created = seed_customer(&pool, "9811111111").await;
        assert_eq!(created.vehicles.len(), 1);
        seed_customer(&pool, "9822222222").await;

        let by_plate = find_all(&pool, Some("mn2020")).await.unwrap();
        assert_eq!(by_plate.len(), 2);

        let by_phone = find_all(&pool, Some("98111")).await.unwrap();
        assert_eq!(by_phone.len(), 1);
        assert_eq!(by_phone[0].id, created.id);
        assert_eq!(by_phone[0].vehicles.len(), 1);

        assert_eq!(find_all(&pool, None).await.unwrap().len(), 2);
        assert!(find_all(&pool, Some("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_phone_is_reported() {
        let pool = test_pool().await;
        seed_customer(&pool, "9833333333").await;
        let err = create(
            &pool,
            CustomerCreate {
                name: "Other".into(),
                phone: " 9833333333 ".into(),
                email: None,
                address: None,
                notes: None,
                vehicles: vec![],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn delete_cascades_vehicles() {
        let pool = test_pool().await;
        let customer = seed_customer(&pool, "9844444444").await;
        let vehicle_id = customer.vehicles[0].id;
        assert!(delete(&pool, customer.id).await.unwrap());
        assert!(vehicle::find_by_id(&pool, vehicle_id).await.unwrap().is_none());
        assert!(!delete(&pool, customer.id).await.unwrap());
    }
}
