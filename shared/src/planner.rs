//! Item expansion planner
//!
//! Turns the unlaunched remainder of each purchase line into launch rows.
//! The serialized/bulk decision is made per line, so a single order can mix
//! devices that need an IMEI with accessories counted in bulk.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{InventoryUnit, LaunchRow, PurchaseItem, PurchaseOrder};
use crate::options::RowDefaults;

/// How a purchase line is expanded
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// One row per device, quantity 1
    Serialized,
    /// A single row carrying the whole remainder
    Bulk,
}

impl LaunchMode {
    pub fn for_item(item: &PurchaseItem) -> Self {
        if item.has_imei {
            LaunchMode::Serialized
        } else {
            LaunchMode::Bulk
        }
    }
}

/// Quantities for one purchase line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlannedItem {
    pub purchase_item_id: Uuid,
    pub mode: LaunchMode,
    pub ordered: i32,
    pub launched: i32,
    /// `ordered - launched`; negative when a line was over-launched
    pub remaining: i32,
}

impl PlannedItem {
    pub fn launchable(&self) -> i32 {
        self.remaining.max(0)
    }
}

/// Proposed rows for a launch session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchPlan {
    pub items: Vec<PlannedItem>,
    pub rows: Vec<LaunchRow>,
}

impl LaunchPlan {
    /// Nothing left to launch; a terminal state, not an error
    pub fn is_fully_launched(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn units(&self) -> i64 {
        self.rows.iter().map(|row| i64::from(row.quantity)).sum()
    }
}

/// Stock of existing units launched from the given line
pub fn launched_count(item_id: Uuid, units: &[InventoryUnit]) -> i32 {
    units
        .iter()
        .filter(|unit| unit.purchase_item_id == Some(item_id))
        .map(|unit| unit.fields.stock)
        .sum()
}

pub fn remaining_for_item(item: &PurchaseItem, units: &[InventoryUnit]) -> i32 {
    item.quantity - launched_count(item.id, units)
}

/// Expand every line of the order into the rows still to be launched
pub fn plan_launch(
    order: &PurchaseOrder,
    units: &[InventoryUnit],
    defaults: &RowDefaults,
) -> LaunchPlan {
    let mut items = Vec::with_capacity(order.items.len());
    let mut rows = Vec::new();

    for item in &order.items {
        let launched = launched_count(item.id, units);
        let planned = PlannedItem {
            purchase_item_id: item.id,
            mode: LaunchMode::for_item(item),
            ordered: item.quantity,
            launched,
            remaining: item.quantity - launched,
        };

        let launchable = planned.launchable();
        if launchable > 0 {
            match planned.mode {
                LaunchMode::Serialized => {
                    rows.extend((0..launchable).map(|_| row_for_item(item, 1, defaults)));
                }
                LaunchMode::Bulk => rows.push(row_for_item(item, launchable, defaults)),
            }
        }
        items.push(planned);
    }

    LaunchPlan { items, rows }
}

/// A fresh row for `item` with identifiers blank and the rest taken from
/// the purchase snapshot
pub fn row_for_item(item: &PurchaseItem, quantity: i32, defaults: &RowDefaults) -> LaunchRow {
    let details = &item.product_details;
    let serialized = item.has_imei;

    LaunchRow {
        purchase_item_id: item.id,
        description: details.description(),
        condition: defaults.condition_or(details.condition.as_deref()),
        warranty: defaults.warranty_or(details.warranty.as_deref()),
        storage_location: defaults.location_or(details.storage_location.as_deref()),
        cost: item.unit_cost,
        additional_cost: item.additional_cost.max(Decimal::ZERO),
        quantity,
        minimum_stock: if serialized { None } else { item.minimum_stock },
        ..Default::default()
    }
}
