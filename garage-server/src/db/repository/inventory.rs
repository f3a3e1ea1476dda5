//! Inventory Repository (items and film rolls)

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use shared::models::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, InventoryRoll, RollStatus,
};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const ITEM_SELECT: &str = "SELECT id, name, sku, category, unit, is_roll_based, quantity, reorder_level, cost_per_unit, supplier, notes, created_at, updated_at FROM inventory_item";

const ROLL_SELECT: &str = "SELECT id, item_id, roll_code, total_meters, remaining_meters, total_sqft, remaining_sqft, status, received_at FROM inventory_roll";

/// Filters for [`find_all`]
#[derive(Debug, Default, Clone)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub low_stock_only: bool,
}

/// List items by name with their rolls attached
pub async fn find_all(pool: &SqlitePool, filter: &ItemFilter) -> RepoResult<Vec<InventoryItem>> {
    let mut sql = format!("{ITEM_SELECT} WHERE 1 = 1");
    if filter.category.is_some() {
        sql.push_str(" AND category = ?1");
    }
    if filter.low_stock_only {
        sql.push_str(" AND quantity <= reorder_level");
    }
    sql.push_str(" ORDER BY name");

    let mut query = sqlx::query_as::<_, InventoryItem>(&sql);
    if let Some(category) = &filter.category {
        query = query.bind(category);
    }
    let mut items = query.fetch_all(pool).await?;

    if items.iter().any(|i| i.is_roll_based) {
        let sql = format!("{ROLL_SELECT} ORDER BY received_at, id");
        let rolls = sqlx::query_as::<_, InventoryRoll>(&sql).fetch_all(pool).await?;
        let mut by_item: HashMap<i64, Vec<InventoryRoll>> = HashMap::new();
        for r in rolls {
            by_item.entry(r.item_id).or_default().push(r);
        }
        for item in &mut items {
            item.rolls = by_item.remove(&item.id).unwrap_or_default();
        }
    }
    Ok(items)
}

pub async fn count_low_stock<'e>(ex: impl SqliteExecutor<'e>) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM inventory_item WHERE quantity <= reorder_level",
    )
    .fetch_one(ex)
    .await?;
    Ok(count)
}

/// Item row without rolls
pub async fn find_by_id<'e>(ex: impl SqliteExecutor<'e>, id: i64) -> RepoResult<Option<InventoryItem>> {
    let sql = format!("{ITEM_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// Item with rolls, oldest roll first
pub async fn find_detail(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<InventoryItem>> {
    let Some(mut item) = find_by_id(&mut *conn, id).await? else {
        return Ok(None);
    };
    item.rolls = find_rolls(&mut *conn, id).await?;
    Ok(Some(item))
}

pub async fn find_with_rolls(pool: &SqlitePool, id: i64) -> RepoResult<Option<InventoryItem>> {
    let mut conn = pool.acquire().await?;
    find_detail(&mut conn, id).await
}

pub async fn create(
    pool: &SqlitePool,
    data: InventoryItemCreate,
    default_reorder_level: f64,
) -> RepoResult<InventoryItem> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let opening = if data.is_roll_based {
        0.0
    } else {
        data.quantity.unwrap_or(0.0)
    };
    sqlx::query(
        "INSERT INTO inventory_item (id, name, sku, category, unit, is_roll_based, quantity, reorder_level, cost_per_unit, supplier, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(&data.sku)
    .bind(data.category.trim())
    .bind(data.unit)
    .bind(data.is_roll_based)
    .bind(opening)
    .bind(data.reorder_level.unwrap_or(default_reorder_level))
    .bind(data.cost_per_unit.unwrap_or(0.0))
    .bind(&data.supplier)
    .bind(&data.notes)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inventory item".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: InventoryItemUpdate) -> RepoResult<InventoryItem> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_item SET name = COALESCE(?1, name), sku = COALESCE(?2, sku), category = COALESCE(?3, category), reorder_level = COALESCE(?4, reorder_level), cost_per_unit = COALESCE(?5, cost_per_unit), supplier = COALESCE(?6, supplier), notes = COALESCE(?7, notes), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(&data.sku)
    .bind(data.category.as_deref().map(str::trim))
    .bind(data.reorder_level)
    .bind(data.cost_per_unit)
    .bind(&data.supplier)
    .bind(&data.notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Inventory item {id} not found")));
    }
    let mut conn = pool.acquire().await?;
    find_detail(&mut conn, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inventory item {id} not found")))
}

/// Hard delete; rolls cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM inventory_item WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Number of job materials drawn from an item
pub async fn count_usage<'e>(ex: impl SqliteExecutor<'e>, item_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job_material WHERE inventory_item_id = ?",
    )
    .bind(item_id)
    .fetch_one(ex)
    .await?;
    Ok(count)
}

/// Apply a stock delta to a non-roll item; `false` when the result would go negative
pub async fn adjust_quantity(
    conn: &mut SqliteConnection,
    item_id: i64,
    delta: f64,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_item SET quantity = MAX(quantity + ?1, 0), updated_at = ?2 WHERE id = ?3 AND is_roll_based = 0 AND quantity + ?1 >= -0.0001",
    )
    .bind(delta)
    .bind(now)
    .bind(item_id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

// ── Rolls ───────────────────────────────────────────────────────────

pub async fn find_rolls<'e>(ex: impl SqliteExecutor<'e>, item_id: i64) -> RepoResult<Vec<InventoryRoll>> {
    let sql = format!("{ROLL_SELECT} WHERE item_id = ? ORDER BY received_at, id");
    let rows = sqlx::query_as::<_, InventoryRoll>(&sql)
        .bind(item_id)
        .fetch_all(ex)
        .await?;
    Ok(rows)
}

pub async fn find_roll<'e>(ex: impl SqliteExecutor<'e>, roll_id: i64) -> RepoResult<Option<InventoryRoll>> {
    let sql = format!("{ROLL_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, InventoryRoll>(&sql)
        .bind(roll_id)
        .fetch_optional(ex)
        .await?;
    Ok(row)
}

/// New full roll
pub struct NewRoll<'a> {
    pub roll_code: &'a str,
    pub total_meters: f64,
    pub total_sqft: f64,
    pub received_at: i64,
}

pub async fn insert_roll(
    conn: &mut SqliteConnection,
    item_id: i64,
    roll: &NewRoll<'_>,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO inventory_roll (id, item_id, roll_code, total_meters, remaining_meters, total_sqft, remaining_sqft, status, received_at) VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?5, ?6, ?7)",
    )
    .bind(id)
    .bind(item_id)
    .bind(roll.roll_code.trim())
    .bind(roll.total_meters)
    .bind(roll.total_sqft)
    .bind(RollStatus::Available)
    .bind(roll.received_at)
    .execute(&mut *conn)
    .await?;
    Ok(id)
}

pub async fn set_roll_remaining(
    conn: &mut SqliteConnection,
    roll_id: i64,
    remaining_meters: f64,
    remaining_sqft: f64,
    status: RollStatus,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE inventory_roll SET remaining_meters = ?1, remaining_sqft = ?2, status = ?3 WHERE id = ?4",
    )
    .bind(remaining_meters)
    .bind(remaining_sqft)
    .bind(status)
    .bind(roll_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete_roll(conn: &mut SqliteConnection, roll_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM inventory_roll WHERE id = ?")
        .bind(roll_id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn roll_has_usage<'e>(ex: impl SqliteExecutor<'e>, roll_id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM job_material WHERE roll_id = ?")
        .bind(roll_id)
        .fetch_one(ex)
        .await?;
    Ok(count > 0)
}

/// Recompute a roll-based item's stock from its rolls, in the item's unit
pub async fn refresh_roll_quantity(conn: &mut SqliteConnection, item_id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE inventory_item SET quantity = COALESCE((SELECT SUM(CASE WHEN inventory_item.unit = 'sqft' THEN r.remaining_sqft ELSE r.remaining_meters END) FROM inventory_roll r WHERE r.item_id = inventory_item.id), 0), updated_at = ?1 WHERE id = ?2 AND is_roll_based = 1",
    )
    .bind(now)
    .bind(item_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing::test_pool;
    use shared::models::InventoryUnit;

    fn film(name: &str) -> InventoryItemCreate {
        InventoryItemCreate {
            name: name.into(),
            sku: None,
            category: "ppf".into(),
            unit: InventoryUnit::Sqft,
            is_roll_based: true,
            quantity: Some(999.0),
            reorder_level: Some(100.0),
            cost_per_unit: Some(45.0),
            supplier: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn roll_items_start_empty_and_track_roll_area() {
        let pool = test_pool().await;
        let item = create(&pool, film("Gloss PPF"), 5.0).await.unwrap();
        assert_eq!(item.quantity, 0.0);
        assert!(item.is_low_stock());

        let mut conn = pool.acquire().await.unwrap();
        for (code, at) in [("R-2", 2), ("R-1", 1)] {
            insert_roll(
                &mut conn,
                item.id,
                &NewRoll {
                    roll_code: code,
                    total_meters: 15.0,
                    total_sqft: 246.06,
                    received_at: at,
                },
            )
            .await
            .unwrap();
        }
        refresh_roll_quantity(&mut conn, item.id).await.unwrap();

        let detail = find_detail(&mut conn, item.id).await.unwrap().unwrap();
        assert!((detail.quantity - 492.12).abs() < 1e-9);
        assert_eq!(detail.rolls[0].roll_code, "R-1");
        assert_eq!(detail.rolls[0].status, RollStatus::Available);
    }

    #[tokio::test]
    async fn low_stock_and_category_filters() {
        let pool = test_pool().await;
        create(&pool, film("Matte PPF"), 5.0).await.unwrap();
        create(
            &pool,
            InventoryItemCreate {
                name: "Ceramic 9H".into(),
                category: "coating".into(),
                unit: InventoryUnit::Pieces,
                is_roll_based: false,
                quantity: Some(20.0),
                reorder_level: None,
                ..film("unused")
            },
            5.0,
        )
        .await
        .unwrap();

        let low = find_all(&pool, &ItemFilter { category: None, low_stock_only: true })
            .await
            .unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Matte PPF");
        assert_eq!(count_low_stock(&pool).await.unwrap(), 1);

        let coatings = find_all(
            &pool,
            &ItemFilter {
                category: Some("coating".into()),
                low_stock_only: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(coatings.len(), 1);
        assert_eq!(coatings[0].reorder_level, 5.0);
    }

    #[tokio::test]
    async fn adjustment_cannot_go_negative() {
        let pool = test_pool().await;
        let item = create(
            &pool,
            InventoryItemCreate {
                unit: InventoryUnit::Liters,
                is_roll_based: false,
                quantity: Some(3.0),
                ..film("Shampoo")
            },
            1.0,
        )
        .await
        .unwrap();
        let mut conn = pool.acquire().await.unwrap();
        assert!(adjust_quantity(&mut conn, item.id, -2.5).await.unwrap());
        assert!(!adjust_quantity(&mut conn, item.id, -1.0).await.unwrap());
        let item = find_by_id(&mut *conn, item.id).await.unwrap().unwrap();
        assert!((item.quantity - 0.5).abs() < 1e-9);
    }
}
