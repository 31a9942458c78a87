//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A supplier purchase order awaiting conversion to inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub display_number: i32,
    pub supplier_id: Option<Uuid>,
    pub supplier_name: Option<String>,
    /// Devices bought over the counter from a customer rather than a supplier
    #[serde(default)]
    pub purchased_from_customer: bool,
    pub items: Vec<PurchaseItem>,
    pub stock_status: StockStatus,
    pub financial_status: FinancialStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    pub fn item(&self, item_id: Uuid) -> Option<&PurchaseItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn has_item(&self, item_id: Uuid) -> bool {
        self.item(item_id).is_some()
    }

    /// Total units ordered across every line
    pub fn ordered_units(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.quantity)).sum()
    }
}

/// A purchase order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub quantity: i32,
    /// One inventory unit per device, identified by IMEI/serial
    pub has_imei: bool,
    #[serde(default)]
    pub control_by_barcode: bool,
    pub unit_cost: Decimal,
    #[serde(default)]
    pub additional_cost: Decimal,
    pub minimum_stock: Option<i32>,
    pub product_details: ProductDetails,
}

/// Product snapshot taken when the purchase was recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductDetails {
    pub brand: String,
    pub model: String,
    pub category: Option<String>,
    pub color: Option<String>,
    /// Storage capacity, e.g. "128GB"
    pub capacity: Option<String>,
    pub condition: Option<String>,
    pub warranty: Option<String>,
    pub storage_location: Option<String>,
}

impl ProductDetails {
    /// Human description used for launch rows, e.g. "Apple iPhone 13 128GB Azul"
    pub fn description(&self) -> String {
        [
            Some(self.brand.as_str()),
            Some(self.model.as_str()),
            self.capacity.as_deref(),
            self.color.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Aggregate stock status of a purchase order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    Pending,
    PartiallyLaunched,
    Launched,
    Cancelled,
}

impl StockStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Pending => "pending",
            StockStatus::PartiallyLaunched => "partially_launched",
            StockStatus::Launched => "launched",
            StockStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(StockStatus::Pending),
            "partially_launched" => Some(StockStatus::PartiallyLaunched),
            "launched" => Some(StockStatus::Launched),
            "cancelled" => Some(StockStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockStatus::Pending => write!(f, "Pending"),
            StockStatus::PartiallyLaunched => write!(f, "Partially Launched"),
            StockStatus::Launched => write!(f, "Launched"),
            StockStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Payment status of a purchase order; owned by the finance flow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinancialStatus {
    #[default]
    Pending,
    PartiallyPaid,
    Paid,
    Cancelled,
}

impl FinancialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialStatus::Pending => "pending",
            FinancialStatus::PartiallyPaid => "partially_paid",
            FinancialStatus::Paid => "paid",
            FinancialStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(FinancialStatus::Pending),
            "partially_paid" => Some(FinancialStatus::PartiallyPaid),
            "paid" => Some(FinancialStatus::Paid),
            "cancelled" => Some(FinancialStatus::Cancelled),
            _ => None,
        }
    }
}
