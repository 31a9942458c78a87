//! Draft restore policy
//!
//! A draft is the in-progress row set of one purchase order. On open it is
//! accepted whole or discarded whole: if any row points at a purchase line
//! that no longer exists, the item set changed shape since the draft was
//! written and partial repair could silently drop manifest rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{InventoryUnit, LaunchRow, PurchaseOrder};
use crate::pricing::markup_from_sale_price;

const DRAFT_KEY_PREFIX: &str = "purchase_launch_draft_";

/// Storage key for the draft of a purchase order
pub fn draft_key(order_id: Uuid) -> String {
    format!("{}{}", DRAFT_KEY_PREFIX, order_id)
}

/// Persisted launch rows of one purchase order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub purchase_order_id: Uuid,
    pub rows: Vec<LaunchRow>,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(purchase_order_id: Uuid, rows: Vec<LaunchRow>) -> Self {
        Self {
            purchase_order_id,
            rows,
            saved_at: Utc::now(),
        }
    }
}

/// Outcome of validating a stored draft against the current order
#[derive(Debug, Clone, PartialEq)]
pub enum DraftRestore {
    Accepted(Vec<LaunchRow>),
    /// Stale draft; drop it and plan fresh
    Discarded { stale_item_ids: Vec<Uuid> },
    Empty,
}

pub fn restore_draft(draft: Option<Draft>, order: &PurchaseOrder) -> DraftRestore {
    let Some(draft) = draft else {
        return DraftRestore::Empty;
    };
    if draft.rows.is_empty() {
        return DraftRestore::Empty;
    }
    if draft.purchase_order_id != order.id {
        return DraftRestore::Discarded {
            stale_item_ids: Vec::new(),
        };
    }

    let mut stale_item_ids: Vec<Uuid> = draft
        .rows
        .iter()
        .map(|row| row.purchase_item_id)
        .filter(|id| !order.has_item(*id))
        .collect();

    if stale_item_ids.is_empty() {
        DraftRestore::Accepted(draft.rows)
    } else {
        stale_item_ids.sort();
        stale_item_ids.dedup();
        DraftRestore::Discarded { stale_item_ids }
    }
}

/// Rebuild launch rows from units about to be reverted, so the operator gets
/// back the manifest that was launched
pub fn draft_from_units(order: &PurchaseOrder, units: &[InventoryUnit]) -> Vec<LaunchRow> {
    units
        .iter()
        .filter_map(|unit| {
            let item_id = unit.purchase_item_id.filter(|id| order.has_item(*id))?;
            let f = &unit.fields;
            let sale_price = (f.sale_price > rust_decimal::Decimal::ZERO).then_some(f.sale_price);
            let markup = f.markup.or_else(|| {
                sale_price.and_then(|price| markup_from_sale_price(f.cost + f.additional_cost, price))
            });

            Some(LaunchRow {
                purchase_item_id: item_id,
                description: f.description.clone(),
                serial_number: f.serial_number.clone().unwrap_or_default(),
                imei1: f.imei1.clone().unwrap_or_default(),
                imei2: f.imei2.clone().unwrap_or_default(),
                condition: f.condition.clone(),
                battery_health: f.battery_health,
                warranty: f.warranty.clone(),
                storage_location: f.storage_location.clone(),
                cost: f.cost,
                additional_cost: f.additional_cost,
                markup,
                sale_price,
                wholesale_price: f.wholesale_price,
                quantity: f.stock,
                minimum_stock: f.minimum_stock,
                barcode: f.barcode.clone().unwrap_or_default(),
                flags: Default::default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductDetails, PurchaseItem, StockStatus, UnitFields};
    use rust_decimal::Decimal;

    fn order_with_items(ids: &[Uuid]) -> PurchaseOrder {
        let order_id = Uuid::new_v4();
        PurchaseOrder {
            id: order_id,
            display_number: 42,
            supplier_id: None,
            supplier_name: Some("Distribuidora Sul".into()),
            purchased_from_customer: false,
            items: ids
                .iter()
                .map(|id| PurchaseItem {
                    id: *id,
                    purchase_order_id: order_id,
                    quantity: 1,
                    has_imei: true,
                    control_by_barcode: false,
                    unit_cost: Decimal::from(100),
                    additional_cost: Decimal::ZERO,
                    minimum_stock: None,
                    product_details: ProductDetails::default(),
                })
                .collect(),
            stock_status: StockStatus::Pending,
            financial_status: Default::default(),
            total_amount: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    fn row(item_id: Uuid) -> LaunchRow {
        LaunchRow {
            purchase_item_id: item_id,
            quantity: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_key_is_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(draft_key(id), draft_key(id));
        assert!(draft_key(id).ends_with(&id.to_string()));
    }

    #[test]
    fn test_valid_draft_is_accepted_whole() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let order = order_with_items(&[a, b]);
        let draft = Draft::new(order.id, vec![row(a), row(b), row(b)]);
        match restore_draft(Some(draft), &order) {
            DraftRestore::Accepted(rows) => assert_eq!(rows.len(), 3),
            other => panic!("expected accepted draft, got {:?}", other),
        }
    }

    #[test]
    fn test_one_stale_row_discards_everything() {
        let (a, removed) = (Uuid::new_v4(), Uuid::new_v4());
        let order = order_with_items(&[a]);
        let draft = Draft::new(order.id, vec![row(a), row(removed), row(removed)]);
        assert_eq!(
            restore_draft(Some(draft), &order),
            DraftRestore::Discarded {
                stale_item_ids: vec![removed]
            }
        );
    }

    #[test]
    fn test_missing_or_empty_draft() {
        let order = order_with_items(&[Uuid::new_v4()]);
        assert_eq!(restore_draft(None, &order), DraftRestore::Empty);
        let empty = Draft::new(order.id, vec![]);
        assert_eq!(restore_draft(Some(empty), &order), DraftRestore::Empty);
    }

    #[test]
    fn test_draft_of_another_order_is_discarded() {
        let a = Uuid::new_v4();
        let order = order_with_items(&[a]);
        let draft = Draft::new(Uuid::new_v4(), vec![row(a)]);
        assert!(matches!(restore_draft(Some(draft), &order), DraftRestore::Discarded { .. }));
    }

    #[test]
    fn test_rows_rebuilt_from_units() {
        let a = Uuid::new_v4();
        let order = order_with_items(&[a]);
        let unit = InventoryUnit {
            id: Uuid::new_v4(),
            purchase_item_id: Some(a),
            purchase_order_id: Some(order.id),
            fields: UnitFields {
                imei1: Some("356938035643809".into()),
                serial_number: None,
                cost: Decimal::from(100),
                sale_price: Decimal::from(150),
                stock: 1,
                condition: "Novo".into(),
                ..Default::default()
            },
            created_at: Utc::now(),
        };
        let rows = draft_from_units(&order, &[unit]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].imei1, "356938035643809");
        assert_eq!(rows[0].serial_number, "");
        assert_eq!(rows[0].sale_price, Some(Decimal::from(150)));
        assert_eq!(rows[0].markup, Some(Decimal::from(50)));
        assert_eq!(rows[0].quantity, 1);
    }
}
