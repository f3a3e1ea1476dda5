//! Stock bookkeeping for film rolls and consumables
//!
//! Roll usage is proportional: every roll carries its own `sqft / meters`
//! ratio (it depends on the roll width), so taking length from a roll always
//! takes the matching area and vice versa.
//!
//! All functions run on a caller-owned transaction. A failed deduction
//! returns before writing anything, and the caller's rollback covers
//! multi-usage requests.

use shared::error::ErrorCode;
use shared::models::{
    InventoryItem, InventoryRoll, InventoryUnit, JobMaterial, MaterialUnit, MaterialUsageInput,
    RollCreate, RollStatus,
};
use sqlx::SqliteConnection;

use crate::db::repository::inventory::{self, NewRoll};
use crate::db::repository::job::{self, NewMaterial};
use crate::utils::money::{to_decimal, to_f64};
use crate::utils::{AppError, AppResult};

/// Remaining amounts closer to zero than this count as empty
pub const STOCK_EPSILON: f64 = 0.0001;

/// Feet per meter
const FEET_PER_METER: f64 = 3.28084;

/// One cut from one roll
#[derive(Debug, Clone, PartialEq)]
pub struct RollCut {
    pub roll_id: i64,
    /// Amount in the requested unit
    pub quantity: f64,
    pub meters: f64,
    pub sqft: f64,
    pub remaining_meters: f64,
    pub remaining_sqft: f64,
    pub status: RollStatus,
}

/// Area of a roll from its length and width
pub fn sqft_from_width(meters: f64, width_inches: f64) -> f64 {
    meters * FEET_PER_METER * width_inches / 12.0
}

fn snap(value: f64) -> f64 {
    if value.abs() < STOCK_EPSILON { 0.0 } else { value }
}

fn insufficient(item: &InventoryItem, requested: f64, available: f64) -> AppError {
    AppError::with_message(
        ErrorCode::InsufficientStock,
        format!(
            "Insufficient stock for {}: requested {requested}, available {available}",
            item.name
        ),
    )
    .with_detail("inventory_item_id", item.id)
    .with_detail("requested", requested)
    .with_detail("available", available)
}

/// Take `amount` (in `unit`) from a single roll
fn cut(roll: &InventoryRoll, amount: f64, unit: MaterialUnit) -> RollCut {
    let ratio = roll.sqft_per_meter();
    let (meters, sqft) = match unit {
        MaterialUnit::Sqft => (if ratio > 0.0 { amount / ratio } else { 0.0 }, amount),
        _ => (amount, amount * ratio),
    };
    let mut remaining_meters = snap(roll.remaining_meters - meters).max(0.0);
    let mut remaining_sqft = snap(roll.remaining_sqft - sqft).max(0.0);
    let status = if remaining_meters <= 0.0 || remaining_sqft <= 0.0 {
        remaining_meters = 0.0;
        remaining_sqft = 0.0;
        RollStatus::Depleted
    } else {
        RollStatus::InUse
    };
    RollCut {
        roll_id: roll.id,
        quantity: amount,
        meters,
        sqft,
        remaining_meters,
        remaining_sqft,
        status,
    }
}

fn available_in(roll: &InventoryRoll, unit: MaterialUnit) -> f64 {
    match unit {
        MaterialUnit::Sqft => roll.remaining_sqft,
        _ => roll.remaining_meters,
    }
}

/// Plan the cuts for one usage of a roll-based item without touching storage.
///
/// With `roll_id` the whole amount must come from that roll; otherwise rolls
/// are drawn oldest first (`rolls` must be sorted by `received_at`).
pub fn plan_roll_usage(
    item: &InventoryItem,
    rolls: &[InventoryRoll],
    roll_id: Option<i64>,
    quantity: f64,
    unit: MaterialUnit,
) -> AppResult<Vec<RollCut>> {
    if unit == MaterialUnit::Units {
        return Err(AppError::with_message(
            ErrorCode::UnitMismatch,
            format!("{} is tracked by roll; use meters or sqft", item.name),
        ));
    }

    if let Some(roll_id) = roll_id {
        let roll = rolls
            .iter()
            .find(|r| r.id == roll_id)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::RollNotFound,
                    format!("Roll {roll_id} does not belong to {}", item.name),
                )
            })?;
        if roll.status == RollStatus::Depleted {
            return Err(AppError::with_message(
                ErrorCode::RollDepleted,
                format!("Roll {} is depleted", roll.roll_code),
            ));
        }
        let available = available_in(roll, unit);
        if quantity > available + STOCK_EPSILON {
            return Err(insufficient(item, quantity, available));
        }
        return Ok(vec![cut(roll, quantity.min(available), unit)]);
    }

    let open: Vec<&InventoryRoll> = rolls
        .iter()
        .filter(|r| r.status != RollStatus::Depleted)
        .collect();
    let total_available: f64 = open.iter().map(|r| available_in(r, unit)).sum();
    if quantity > total_available + STOCK_EPSILON {
        return Err(insufficient(item, quantity, total_available));
    }

    let mut cuts = Vec::new();
    let mut needed = quantity;
    for roll in open {
        if needed <= STOCK_EPSILON {
            break;
        }
        let available = available_in(roll, unit);
        if available <= 0.0 {
            continue;
        }
        let take = needed.min(available);
        cuts.push(cut(roll, take, unit));
        needed -= take;
    }
    Ok(cuts)
}

/// Cost of `amount` expressed in the item's own unit
fn material_cost(item: &InventoryItem, meters: f64, sqft: f64, units: f64) -> f64 {
    let amount = if !item.is_roll_based {
        units
    } else if item.unit == InventoryUnit::Sqft {
        sqft
    } else {
        meters
    };
    to_f64(to_decimal(item.cost_per_unit) * to_decimal(amount))
}

fn validate_usage(usage: &MaterialUsageInput) -> AppResult<()> {
    if !usage.quantity.is_finite() || usage.quantity <= 0.0 {
        return Err(AppError::validation(format!(
            "material quantity must be a positive number, got {}",
            usage.quantity
        )));
    }
    Ok(())
}

/// Deduct one usage from stock and record it against `job_id`.
///
/// Returns one material record per roll touched (a single record for
/// non-roll items).
pub async fn consume(
    conn: &mut SqliteConnection,
    job_id: i64,
    usage: &MaterialUsageInput,
) -> AppResult<Vec<JobMaterial>> {
    validate_usage(usage)?;
    let item = inventory::find_by_id(&mut *conn, usage.inventory_item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InventoryItemNotFound))?;

    let mut ids = Vec::new();
    if item.is_roll_based {
        let rolls = inventory::find_rolls(&mut *conn, item.id).await?;
        let cuts = plan_roll_usage(&item, &rolls, usage.roll_id, usage.quantity, usage.unit)?;
        for c in &cuts {
            inventory::set_roll_remaining(
                conn,
                c.roll_id,
                c.remaining_meters,
                c.remaining_sqft,
                c.status,
            )
            .await?;
            if c.status == RollStatus::Depleted {
                tracing::info!(item_id = item.id, roll_id = c.roll_id, "Roll depleted");
            }
            let id = job::insert_material(
                conn,
                &NewMaterial {
                    job_id,
                    inventory_item_id: item.id,
                    roll_id: Some(c.roll_id),
                    item_name: &item.name,
                    quantity: c.quantity,
                    unit: usage.unit,
                    meters_used: c.meters,
                    sqft_used: c.sqft,
                    cost: material_cost(&item, c.meters, c.sqft, 0.0),
                },
            )
            .await?;
            ids.push(id);
        }
        inventory::refresh_roll_quantity(conn, item.id).await?;
    } else {
        if usage.unit != MaterialUnit::Units {
            return Err(AppError::with_message(
                ErrorCode::UnitMismatch,
                format!("{} is counted in units", item.name),
            ));
        }
        if usage.roll_id.is_some() {
            return Err(AppError::with_message(
                ErrorCode::RollNotFound,
                format!("{} has no rolls", item.name),
            ));
        }
        if usage.quantity > item.quantity + STOCK_EPSILON {
            return Err(insufficient(&item, usage.quantity, item.quantity));
        }
        if !inventory::adjust_quantity(conn, item.id, -usage.quantity).await? {
            return Err(insufficient(&item, usage.quantity, item.quantity));
        }
        let id = job::insert_material(
            conn,
            &NewMaterial {
                job_id,
                inventory_item_id: item.id,
                roll_id: None,
                item_name: &item.name,
                quantity: usage.quantity,
                unit: MaterialUnit::Units,
                meters_used: 0.0,
                sqft_used: 0.0,
                cost: material_cost(&item, 0.0, 0.0, usage.quantity),
            },
        )
        .await?;
        ids.push(id);
    }

    let mut recorded = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(m) = job::find_material(&mut *conn, job_id, id).await? {
            recorded.push(m);
        }
    }

    if let Some(after) = inventory::find_by_id(&mut *conn, item.id).await?
        && after.is_low_stock()
    {
        tracing::warn!(
            item_id = after.id,
            quantity = after.quantity,
            reorder_level = after.reorder_level,
            "Inventory item is low on stock"
        );
    }
    Ok(recorded)
}

/// Put a recorded material back into stock
pub async fn restore(conn: &mut SqliteConnection, material: &JobMaterial) -> AppResult<()> {
    match material.roll_id {
        Some(roll_id) => {
            let Some(roll) = inventory::find_roll(&mut *conn, roll_id).await? else {
                tracing::warn!(roll_id, "Roll no longer exists, material not restored");
                return Ok(());
            };
            let remaining_meters = (roll.remaining_meters + material.meters_used).min(roll.total_meters);
            let remaining_sqft = (roll.remaining_sqft + material.sqft_used).min(roll.total_sqft);
            let status = if (roll.total_meters - remaining_meters).abs() < STOCK_EPSILON {
                RollStatus::Available
            } else if remaining_meters <= STOCK_EPSILON {
                RollStatus::Depleted
            } else {
                RollStatus::InUse
            };
            inventory::set_roll_remaining(conn, roll_id, remaining_meters, remaining_sqft, status)
                .await?;
            inventory::refresh_roll_quantity(conn, roll.item_id).await?;
        }
        None => {
            inventory::adjust_quantity(conn, material.inventory_item_id, material.quantity).await?;
        }
    }
    Ok(())
}

/// Validate and register a new roll, refreshing the item's stock
pub async fn add_roll(conn: &mut SqliteConnection, item_id: i64, data: &RollCreate) -> AppResult<()> {
    let item = inventory::find_by_id(&mut *conn, item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InventoryItemNotFound))?;
    if !item.is_roll_based {
        return Err(AppError::with_message(
            ErrorCode::UnitMismatch,
            format!("{} is not tracked by roll", item.name),
        ));
    }
    crate::utils::validation::validate_required_text(
        &data.roll_code,
        "roll_code",
        crate::utils::validation::MAX_SHORT_TEXT_LEN,
    )?;
    if !data.total_meters.is_finite() || data.total_meters <= 0.0 {
        return Err(AppError::validation("total_meters must be positive"));
    }
    let total_sqft = match (data.total_sqft, data.width_inches) {
        (Some(sqft), _) => sqft,
        (None, Some(width)) if width.is_finite() && width > 0.0 => {
            sqft_from_width(data.total_meters, width)
        }
        _ => {
            return Err(AppError::with_message(
                ErrorCode::RequiredField,
                "total_sqft or width_inches is required",
            ));
        }
    };
    if !total_sqft.is_finite() || total_sqft <= 0.0 {
        return Err(AppError::validation("total_sqft must be positive"));
    }

    inventory::insert_roll(
        conn,
        item_id,
        &NewRoll {
            roll_code: &data.roll_code,
            total_meters: data.total_meters,
            total_sqft,
            received_at: data.received_at.unwrap_or_else(shared::util::now_millis),
        },
    )
    .await?;
    inventory::refresh_roll_quantity(conn, item_id).await?;
    Ok(())
}

/// Remove an unused roll
pub async fn remove_roll(conn: &mut SqliteConnection, item_id: i64, roll_id: i64) -> AppResult<()> {
    let roll = inventory::find_roll(&mut *conn, roll_id)
        .await?
        .filter(|r| r.item_id == item_id)
        .ok_or_else(|| AppError::new(ErrorCode::RollNotFound))?;
    if roll.status != RollStatus::Available || inventory::roll_has_usage(&mut *conn, roll_id).await? {
        return Err(AppError::with_message(
            ErrorCode::RollInUse,
            format!("Roll {} has already been cut", roll.roll_code),
        ));
    }
    inventory::delete_roll(conn, roll_id).await?;
    inventory::refresh_roll_quantity(conn, item_id).await?;
    Ok(())
}

/// Manual correction of a non-roll item's stock
pub async fn adjust(conn: &mut SqliteConnection, item_id: i64, delta: f64, reason: Option<&str>) -> AppResult<()> {
    if !delta.is_finite() || delta == 0.0 {
        return Err(AppError::validation("delta must be a non-zero number"));
    }
    let item = inventory::find_by_id(&mut *conn, item_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::InventoryItemNotFound))?;
    if item.is_roll_based {
        return Err(AppError::with_message(
            ErrorCode::UnitMismatch,
            format!("{} is tracked by roll; add or remove rolls instead", item.name),
        ));
    }
    if !inventory::adjust_quantity(conn, item_id, delta).await? {
        return Err(insufficient(&item, -delta, item.quantity));
    }
    tracing::info!(item_id, delta, reason = reason.unwrap_or(""), "Stock adjusted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> InventoryItem {
        InventoryItem {
            id: 1,
            name: "Gloss PPF".into(),
            sku: None,
            category: "ppf".into(),
            unit: InventoryUnit::Sqft,
            is_roll_based: true,
            quantity: 0.0,
            reorder_level: 0.0,
            cost_per_unit: 40.0,
            supplier: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
            rolls: vec![],
        }
    }

    /// 15 m x 60 in roll: 4.92126 sqft per meter
    fn roll(id: i64, remaining_meters: f64) -> InventoryRoll {
        let total_sqft = sqft_from_width(15.0, 60.0);
        let ratio = total_sqft / 15.0;
        InventoryRoll {
            id,
            item_id: 1,
            roll_code: format!("R{id}"),
            total_meters: 15.0,
            remaining_meters,
            total_sqft,
            remaining_sqft: remaining_meters * ratio,
            status: if remaining_meters == 15.0 {
                RollStatus::Available
            } else {
                RollStatus::InUse
            },
            received_at: id,
        }
    }

    #[test]
    fn width_conversion() {
        let sqft = sqft_from_width(15.0, 60.0);
        assert!((sqft - 246.063).abs() < 1e-3);
    }

    #[test]
    fn meters_take_proportional_area() {
        let cuts = plan_roll_usage(&item(), &[roll(1, 15.0)], Some(1), 3.0, MaterialUnit::Meters).unwrap();
        assert_eq!(cuts.len(), 1);
        let c = &cuts[0];
        assert!((c.sqft - 3.0 * 4.92126).abs() < 1e-4);
        assert!((c.remaining_meters - 12.0).abs() < 1e-9);
        assert_eq!(c.status, RollStatus::InUse);
    }

    #[test]
    fn sqft_take_proportional_length() {
        let r = roll(1, 15.0);
        let cuts = plan_roll_usage(&item(), &[r.clone()], None, r.total_sqft / 3.0, MaterialUnit::Sqft).unwrap();
        assert!((cuts[0].meters - 5.0).abs() < 1e-9);
        assert!((cuts[0].remaining_meters - 10.0).abs() < 1e-9);
    }

    #[test]
    fn fifo_spans_rolls_oldest_first() {
        let rolls = [roll(1, 2.0), roll(2, 15.0)];
        let cuts = plan_roll_usage(&item(), &rolls, None, 5.0, MaterialUnit::Meters).unwrap();
        assert_eq!(cuts.len(), 2);
        assert_eq!(cuts[0].roll_id, 1);
        assert_eq!(cuts[0].status, RollStatus::Depleted);
        assert_eq!(cuts[0].remaining_sqft, 0.0);
        assert_eq!(cuts[1].roll_id, 2);
        assert!((cuts[1].quantity - 3.0).abs() < 1e-9);
        assert!((cuts[1].remaining_meters - 12.0).abs() < 1e-9);
    }

    #[test]
    fn near_zero_remainder_snaps_to_depleted() {
        let cuts = plan_roll_usage(&item(), &[roll(1, 4.00005)], Some(1), 4.0, MaterialUnit::Meters).unwrap();
        assert_eq!(cuts[0].status, RollStatus::Depleted);
        assert_eq!(cuts[0].remaining_meters, 0.0);
    }

    #[test]
    fn insufficient_stock_is_rejected() {
        let err = plan_roll_usage(&item(), &[roll(1, 2.0), roll(2, 1.0)], None, 3.5, MaterialUnit::Meters)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);

        let err = plan_roll_usage(&item(), &[roll(1, 2.0)], Some(1), 2.5, MaterialUnit::Meters).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn roll_choice_is_validated() {
        let mut depleted = roll(1, 0.0);
        depleted.status = RollStatus::Depleted;
        let err = plan_roll_usage(&item(), &[depleted], Some(1), 1.0, MaterialUnit::Meters).unwrap_err();
        assert_eq!(err.code, ErrorCode::RollDepleted);

        let err = plan_roll_usage(&item(), &[roll(1, 5.0)], Some(9), 1.0, MaterialUnit::Meters).unwrap_err();
        assert_eq!(err.code, ErrorCode::RollNotFound);

        let err = plan_roll_usage(&item(), &[roll(1, 5.0)], None, 1.0, MaterialUnit::Units).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnitMismatch);
    }

    #[test]
    fn cost_uses_item_unit() {
        let film = item();
        assert_eq!(material_cost(&film, 2.0, 10.0, 0.0), 400.0);
        let mut by_meter = item();
        by_meter.unit = InventoryUnit::Meters;
        assert_eq!(material_cost(&by_meter, 2.0, 10.0, 0.0), 80.0);
        let mut bottle = item();
        bottle.is_roll_based = false;
        assert_eq!(material_cost(&bottle, 0.0, 0.0, 3.0), 120.0);
    }
}
