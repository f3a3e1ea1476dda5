//! Inventory API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    InventoryItem, InventoryItemCreate, InventoryItemUpdate, RollCreate, StockAdjustment,
};

use crate::api::repo_error;
use crate::core::ServerState;
use crate::db;
use crate::db::repository::inventory::{self, ItemFilter};
use crate::services::stock;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    #[serde(default)]
    pub low_stock: bool,
}

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::InventoryItemNotFound).with_detail("inventory_item_id", id)
}

async fn detail(state: &ServerState, id: i64) -> AppResult<InventoryItem> {
    inventory::find_with_rolls(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/inventory?category=&low_stock=
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    let filter = ItemFilter {
        category: query.category.filter(|c| !c.trim().is_empty()),
        low_stock_only: query.low_stock,
    };
    Ok(Json(inventory::find_all(&state.pool, &filter).await?))
}

/// GET /api/inventory/low-stock
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<InventoryItem>>> {
    let filter = ItemFilter {
        low_stock_only: true,
        ..Default::default()
    };
    Ok(Json(inventory::find_all(&state.pool, &filter).await?))
}

/// GET /api/inventory/:id - item with its rolls
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<InventoryItem>> {
    Ok(Json(detail(&state, id).await?))
}

/// POST /api/inventory
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<InventoryItemCreate>,
) -> AppResult<Json<InventoryItem>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_non_negative(payload.quantity, "quantity")?;
    validate_non_negative(payload.reorder_level, "reorder_level")?;
    validate_non_negative(payload.cost_per_unit, "cost_per_unit")?;

    let created = inventory::create(&state.pool, payload, state.config.low_stock_default)
        .await
        .map_err(repo_error(ErrorCode::InventoryItemNotFound, ErrorCode::SkuExists))?;
    tracing::info!(
        inventory_item_id = created.id,
        roll_based = created.is_roll_based,
        "Inventory item created"
    );
    Ok(Json(created))
}

/// PUT /api/inventory/:id
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<InventoryItemUpdate>,
) -> AppResult<Json<InventoryItem>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(category) = &payload.category {
        validate_required_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_non_negative(payload.reorder_level, "reorder_level")?;
    validate_non_negative(payload.cost_per_unit, "cost_per_unit")?;

    let updated = inventory::update(&state.pool, id, payload)
        .await
        .map_err(repo_error(ErrorCode::InventoryItemNotFound, ErrorCode::SkuExists))?;
    Ok(Json(updated))
}

/// DELETE /api/inventory/:id - refused once a job has drawn from the item
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let item = detail(&state, id).await?;
    let used = inventory::count_usage(&state.pool, id).await?;
    if used > 0 {
        return Err(AppError::with_message(
            ErrorCode::InventoryItemInUse,
            format!("{} is referenced by {used} job material(s)", item.name),
        ));
    }
    Ok(Json(inventory::delete(&state.pool, id).await?))
}

/// POST /api/inventory/:id/rolls
pub async fn add_roll(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RollCreate>,
) -> AppResult<Json<InventoryItem>> {
    let mut tx = db::begin(&state.pool).await?;
    stock::add_roll(&mut tx, id, &payload)
        .await
        .map_err(|e| match e.code {
            ErrorCode::AlreadyExists => AppError::with_message(
                ErrorCode::AlreadyExists,
                format!("Roll {} already exists for this item", payload.roll_code.trim()),
            ),
            _ => e,
        })?;
    let item = inventory::find_detail(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    db::commit(tx).await?;
    tracing::info!(inventory_item_id = id, roll_code = %payload.roll_code, "Roll received");
    Ok(Json(item))
}

/// DELETE /api/inventory/:id/rolls/:roll_id
pub async fn delete_roll(
    State(state): State<ServerState>,
    Path((id, roll_id)): Path<(i64, i64)>,
) -> AppResult<Json<InventoryItem>> {
    let mut tx = db::begin(&state.pool).await?;
    stock::remove_roll(&mut tx, id, roll_id).await?;
    let item = inventory::find_detail(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    db::commit(tx).await?;
    Ok(Json(item))
}

/// POST /api/inventory/:id/adjust
pub async fn adjust(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<InventoryItem>> {
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    let mut tx = db::begin(&state.pool).await?;
    stock::adjust(&mut tx, id, payload.delta, payload.reason.as_deref()).await?;
    let item = inventory::find_detail(&mut tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    db::commit(tx).await?;
    Ok(Json(item))
}

#[cfg(test)]
mod tests {
    use crate::services::http::testing::{send, test_router};
    use http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn roll_lifecycle_over_http() {
        let router = test_router().await;
        let (status, item) = send(
            &router,
            "POST",
            "/api/inventory",
            Some(json!({
                "name": "XPEL Ultimate Plus",
                "sku": "XPEL-UP-60",
                "category": "ppf",
                "unit": "sqft",
                "is_roll_based": true,
                "cost_per_unit": 45.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = item["id"].as_i64().unwrap();
        assert_eq!(item["reorder_level"], 5.0);

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/inventory/{id}/rolls"),
            Some(json!({ "roll_code": "R-001", "total_meters": 15.0, "width_inches": 60.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rolls"].as_array().unwrap().len(), 1);
        assert!((body["quantity"].as_f64().unwrap() - 246.06).abs() < 0.01);

        let roll_id = body["rolls"][0]["id"].as_i64().unwrap();
        let (status, body) = send(
            &router,
            "DELETE",
            &format!("/api/inventory/{id}/rolls/{roll_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 0.0);

        let (status, _) = send(
            &router,
            "POST",
            "/api/inventory",
            Some(json!({ "name": "Dup", "sku": "XPEL-UP-60", "category": "ppf", "unit": "sqft" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn adjust_cannot_go_negative() {
        let router = test_router().await;
        let (_, item) = send(
            &router,
            "POST",
            "/api/inventory",
            Some(json!({ "name": "Clay bar", "category": "consumables", "unit": "pieces", "quantity": 3.0 })),
        )
        .await;
        let id = item["id"].as_i64().unwrap();

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/inventory/{id}/adjust"),
            Some(json!({ "delta": -5.0, "reason": "count correction" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], 3002);

        let (status, body) = send(
            &router,
            "POST",
            &format!("/api/inventory/{id}/adjust"),
            Some(json!({ "delta": -3.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["quantity"], 0.0);

        let (_, low) = send(&router, "GET", "/api/inventory/low-stock", None).await;
        assert_eq!(low.as_array().unwrap().len(), 1);
    }
}
