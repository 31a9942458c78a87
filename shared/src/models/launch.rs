//! Launch rows and the inventory units they become

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of an in-progress stock launch.
///
/// For serialized items a row is exactly one device (`quantity == 1`); for
/// bulk items a single row carries the whole remaining quantity of its line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRow {
    /// Back-reference to the purchase line, not ownership
    pub purchase_item_id: Uuid,
    pub description: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub imei1: String,
    #[serde(default)]
    pub imei2: String,
    pub condition: String,
    /// Battery health in percent
    pub battery_health: Option<i32>,
    pub warranty: String,
    pub storage_location: String,
    pub cost: Decimal,
    #[serde(default)]
    pub additional_cost: Decimal,
    pub markup: Option<Decimal>,
    pub sale_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub quantity: i32,
    pub minimum_stock: Option<i32>,
    #[serde(default)]
    pub barcode: String,
    /// Fields the operator must correct before the batch can be launched
    #[serde(default)]
    pub flags: RowFlags,
}

impl LaunchRow {
    /// Trimmed, non-empty identifier values of this row
    pub fn imeis(&self) -> impl Iterator<Item = (IdentifierField, &str)> {
        [
            (IdentifierField::Imei1, self.imei1.trim()),
            (IdentifierField::Imei2, self.imei2.trim()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
    }

    pub fn serial(&self) -> Option<&str> {
        let serial = self.serial_number.trim();
        (!serial.is_empty()).then_some(serial)
    }

    pub fn identifier(&self, field: IdentifierField) -> &str {
        match field {
            IdentifierField::SerialNumber => &self.serial_number,
            IdentifierField::Imei1 => &self.imei1,
            IdentifierField::Imei2 => &self.imei2,
        }
    }

    pub fn has_sale_price(&self) -> bool {
        self.sale_price.is_some_and(|price| price > Decimal::ZERO)
    }
}

/// Identifier slots checked for duplicates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum IdentifierField {
    SerialNumber,
    Imei1,
    Imei2,
}

impl IdentifierField {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierField::SerialNumber => "Serial",
            IdentifierField::Imei1 => "IMEI 1",
            IdentifierField::Imei2 => "IMEI 2",
        }
    }
}

/// Per-field correction markers
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RowFlags {
    #[serde(default)]
    pub serial_number: bool,
    #[serde(default)]
    pub imei1: bool,
    #[serde(default)]
    pub imei2: bool,
    #[serde(default)]
    pub sale_price: bool,
    #[serde(default)]
    pub quantity: bool,
}

impl RowFlags {
    pub fn any(&self) -> bool {
        self.serial_number || self.imei1 || self.imei2 || self.sale_price || self.quantity
    }

    pub fn mark(&mut self, field: IdentifierField) {
        self.set(field, true);
    }

    pub fn set(&mut self, field: IdentifierField, value: bool) {
        match field {
            IdentifierField::SerialNumber => self.serial_number = value,
            IdentifierField::Imei1 => self.imei1 = value,
            IdentifierField::Imei2 => self.imei2 = value,
        }
    }

    pub fn is_marked(&self, field: IdentifierField) -> bool {
        match field {
            IdentifierField::SerialNumber => self.serial_number,
            IdentifierField::Imei1 => self.imei1,
            IdentifierField::Imei2 => self.imei2,
        }
    }
}

/// Where a launched unit came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnitOrigin {
    #[default]
    Purchase,
    PurchasedFromCustomer,
}

impl UnitOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOrigin::Purchase => "purchase",
            UnitOrigin::PurchasedFromCustomer => "purchased_from_customer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "purchase" => Some(UnitOrigin::Purchase),
            "purchased_from_customer" => Some(UnitOrigin::PurchasedFromCustomer),
            _ => None,
        }
    }
}

/// A launched inventory unit (catalog product row)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUnit {
    pub id: Uuid,
    /// Units created outside a purchase launch carry no item reference
    pub purchase_item_id: Option<Uuid>,
    pub purchase_order_id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: UnitFields,
    pub created_at: DateTime<Utc>,
}

/// Creation payload for one inventory unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitPayload {
    pub purchase_item_id: Uuid,
    pub purchase_order_id: Uuid,
    pub supplier_id: Option<Uuid>,
    #[serde(flatten)]
    pub fields: UnitFields,
}

/// Descriptive and pricing fields shared by payloads and stored units
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitFields {
    pub description: String,
    pub brand: String,
    pub model: String,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    pub imei1: Option<String>,
    pub imei2: Option<String>,
    pub condition: String,
    pub battery_health: Option<i32>,
    pub warranty: String,
    pub storage_location: String,
    pub cost: Decimal,
    pub additional_cost: Decimal,
    pub markup: Option<Decimal>,
    pub sale_price: Decimal,
    pub wholesale_price: Option<Decimal>,
    pub stock: i32,
    pub minimum_stock: Option<i32>,
    pub barcode: Option<String>,
    pub origin: UnitOrigin,
}

/// Totals shown in the launch footer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchSummary {
    pub rows: usize,
    pub units: i64,
    pub total_cost: Decimal,
    /// Sum of sale price times quantity over rows that have a price
    pub total_sale: Decimal,
}

impl LaunchSummary {
    pub fn of(rows: &[LaunchRow]) -> Self {
        rows.iter().fold(
            LaunchSummary {
                rows: rows.len(),
                ..Default::default()
            },
            |mut acc, row| {
                let quantity = Decimal::from(row.quantity);
                acc.units += i64::from(row.quantity);
                // Saturate; totals are display-only and rows come from clients
                let cost = row.cost.saturating_add(row.additional_cost);
                acc.total_cost = acc.total_cost.saturating_add(cost.saturating_mul(quantity));
                if let Some(price) = row.sale_price {
                    acc.total_sale = acc.total_sale.saturating_add(price.saturating_mul(quantity));
                }
                acc
            },
        )
    }
}
