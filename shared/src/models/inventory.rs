//! Inventory Models (film rolls, coatings, consumables)

use serde::{Deserialize, Serialize};

/// Stock unit of an inventory item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum InventoryUnit {
    Meters,
    Sqft,
    Pieces,
    Liters,
    Ml,
}

/// Lifecycle of a physical film roll
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RollStatus {
    /// Never cut from
    Available,
    /// Partially used
    InUse,
    /// Nothing left
    Depleted,
}

/// Inventory item entity
///
/// For roll-based items `quantity` is the remaining stock summed over all
/// rolls, in the item's unit (sqft when the unit is sqft, meters otherwise).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub category: String,
    pub unit: InventoryUnit,
    pub is_roll_based: bool,
    pub quantity: f64,
    pub reorder_level: f64,
    /// Cost per one `unit`
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub rolls: Vec<InventoryRoll>,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

/// Physical roll of film belonging to a roll-based inventory item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryRoll {
    pub id: i64,
    pub item_id: i64,
    pub roll_code: String,
    pub total_meters: f64,
    pub remaining_meters: f64,
    pub total_sqft: f64,
    pub remaining_sqft: f64,
    pub status: RollStatus,
    pub received_at: i64,
}

impl InventoryRoll {
    /// Area covered by one meter of this roll (depends on roll width)
    pub fn sqft_per_meter(&self) -> f64 {
        if self.total_meters > 0.0 {
            self.total_sqft / self.total_meters
        } else {
            0.0
        }
    }
}

/// Create inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub name: String,
    pub sku: Option<String>,
    pub category: String,
    pub unit: InventoryUnit,
    #[serde(default)]
    pub is_roll_based: bool,
    /// Opening stock (non-roll items only)
    pub quantity: Option<f64>,
    pub reorder_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Update inventory item payload (unit and roll flag are fixed at creation)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub reorder_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

/// Add roll payload
///
/// Either `total_sqft` or `width_inches` must be given; the area is derived
/// from the width when it is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollCreate {
    pub roll_code: String,
    pub total_meters: f64,
    pub total_sqft: Option<f64>,
    pub width_inches: Option<f64>,
    pub received_at: Option<i64>,
}

/// Manual stock correction for non-roll items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Positive to add stock, negative to remove
    pub delta: f64,
    pub reason: Option<String>,
}
